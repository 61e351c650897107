mod config;
mod date;
mod paths;
mod util;
mod mem;
mod progress;
mod concurrency;
mod jsonl;

mod decoder;
mod record;
mod filters;
mod sink;
mod pipeline;

mod schema;
mod batch;
mod coerce;
mod sidecar;
mod merge;
mod canonical;
mod reconcile;

pub use crate::config::{PipelineConfig, DEFAULT_END_UTC, DEFAULT_START_UTC, DEFAULT_SUBREDDITS};
pub use crate::date::YearMonth;
pub use crate::pipeline::{ArchiveFilter, FilterReport};
pub use crate::reconcile::{Reconciler, ReconcileReport};

// Language identifiers are part of the configuration surface.
pub use whatlang::Lang;

// Expose filter and sink primitives for embedding and tests.
pub use crate::filters::{detect_language, RecordFilter, RecordVerdict};
pub use crate::record::{parse_minimal, MinimalPost};
pub use crate::sink::{PartitionKey, PartitionSink};

// Expose zstd streaming + validators so callers can pre-check corpora.
pub use crate::decoder::{full_validate, quick_validate, stream_records};

// Reconciliation building blocks.
pub use crate::batch::{load_batch, Batch, Row};
pub use crate::canonical::{
    canonical_name, default_for, TextCleaner, COLUMN_RENAMES, NA_SENTINEL,
    OPTIONAL_METADATA_COLUMNS,
};
pub use crate::coerce::{coerce_cell, lenient_float, lenient_int};
pub use crate::merge::{merge_dedup, MergeStats};
pub use crate::schema::{resolve_column_type, value_type, ColumnType};
pub use crate::sidecar::SIDECAR_COLUMN;

// Robust file ops so binaries can import from the crate root.
pub use crate::util::{
    append_with_backoff, create_with_backoff, open_with_backoff, replace_file_atomic_backoff,
};
