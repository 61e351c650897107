//! Permissive, fallback-safe cell coercion toward resolved column types.
//! The pipeline never raises on a single malformed cell; it degrades the
//! cell to a default and continues.

use crate::batch::Batch;
use crate::schema::ColumnType;
use ahash::AHashMap;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Per-column fallback counts for one coercion run. Logged at column
/// granularity to bound log volume.
#[derive(Debug, Default)]
pub struct CoerceStats {
    pub fallbacks: AHashMap<String, u64>,
}

impl CoerceStats {
    pub fn merge(&mut self, other: CoerceStats) {
        for (col, n) in other.fallbacks {
            *self.fallbacks.entry(col).or_insert(0) += n;
        }
    }

    pub fn log(&self) {
        for (col, n) in &self.fallbacks {
            tracing::warn!("Column '{}' degraded {} cells to fallback defaults", col, n);
        }
    }

    pub fn total(&self) -> u64 {
        self.fallbacks.values().sum()
    }
}

/// Rewrite `batch`'s columns whose observed type differs from the resolved
/// target. Total: every touched cell yields a value of the target type.
pub fn coerce_batch(batch: &mut Batch, resolved: &BTreeMap<String, ColumnType>) -> CoerceStats {
    let mut stats = CoerceStats::default();
    let needs: Vec<(String, ColumnType)> = batch
        .schema
        .iter()
        .filter_map(|(col, obs)| {
            let target = *resolved.get(col)?;
            (target != *obs).then(|| (col.clone(), target))
        })
        .collect();
    if needs.is_empty() {
        return stats;
    }

    for row in batch.rows.iter_mut() {
        for (col, target) in &needs {
            if let Some(cell) = row.get_mut(col.as_str()) {
                let (new, fell_back) = coerce_cell(cell, *target);
                if fell_back {
                    *stats.fallbacks.entry(col.clone()).or_insert(0) += 1;
                }
                *cell = new;
            }
        }
    }
    for (col, target) in needs {
        batch.schema.insert(col, target);
    }
    stats
}

/// Convert one cell to `target`. Returns the new value and whether a lossy
/// fallback was taken.
pub fn coerce_cell(cell: &Value, target: ColumnType) -> (Value, bool) {
    match target {
        ColumnType::Float => match cell {
            Value::Number(n) => (float_value(n.as_f64().unwrap_or(0.0)), false),
            Value::Null => (float_value(0.0), true),
            other => match lenient_float(&string_form(other)) {
                Some(v) => (float_value(v), false),
                None => (float_value(0.0), true),
            },
        },
        ColumnType::Int => match cell {
            Value::Number(n) if n.is_i64() => (cell.clone(), false),
            Value::Null => (Value::from(0i64), true),
            other => match lenient_int(&string_form(other)) {
                Some(v) => (Value::from(v), false),
                None => (Value::from(0i64), true),
            },
        },
        ColumnType::Str => match cell {
            Value::String(_) => (cell.clone(), false),
            Value::Null => (Value::String(String::new()), true),
            Value::Bool(b) => (Value::String(b.to_string()), false),
            Value::Number(n) => (Value::String(n.to_string()), false),
            nested => (Value::String(nested.to_string()), false),
        },
        // Bool and Null targets only arise without a cross-batch conflict;
        // cells pass through and remaining nulls are handled by the
        // canonicalizer's null-fill.
        ColumnType::Bool | ColumnType::Null => (cell.clone(), false),
    }
}

/// Strip every character that is not an ASCII digit or `.` (the sign comes
/// from a leading `-`), then parse. `None` when nothing parseable remains.
pub fn lenient_float(s: &str) -> Option<f64> {
    let neg = s.trim_start().starts_with('-');
    let cleaned: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().map(|v| if neg { -v } else { v })
}

/// Digits-only variant of `lenient_float`.
pub fn lenient_int(s: &str) -> Option<i64> {
    let neg = s.trim_start().starts_with('-');
    let cleaned: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok().map(|v| if neg { -v } else { v })
}

fn string_form(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
