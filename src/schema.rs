//! Column types and the global type-resolution pass.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Flat column type observed in, or resolved for, a batch column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    Null,
    Bool,
    Int,
    Float,
    Str,
}

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Null => "null",
            ColumnType::Bool => "bool",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Str => "str",
        }
    }
}

/// Type of one JSON cell. Nested values count as strings: the ingest layer
/// serializes nested payloads, and anything structured left over is
/// display-cast during coercion.
pub fn value_type(v: &Value) -> ColumnType {
    match v {
        Value::Null => ColumnType::Null,
        Value::Bool(_) => ColumnType::Bool,
        Value::Number(n) if n.is_i64() || n.is_u64() => ColumnType::Int,
        Value::Number(_) => ColumnType::Float,
        Value::String(_) => ColumnType::Str,
        Value::Array(_) | Value::Object(_) => ColumnType::Str,
    }
}

/// Collapse a set of observed types into one target type.
/// Pure and order-independent. On conflict the most permissive observed type
/// wins: `Str > Float > Int > Bool > Null`.
pub fn resolve_column_type(observed: &BTreeSet<ColumnType>) -> ColumnType {
    if observed.len() == 1 {
        return *observed.iter().next().unwrap();
    }
    if observed.contains(&ColumnType::Str) {
        ColumnType::Str
    } else if observed.contains(&ColumnType::Float) {
        ColumnType::Float
    } else if observed.contains(&ColumnType::Int) {
        ColumnType::Int
    } else if observed.contains(&ColumnType::Bool) {
        ColumnType::Bool
    } else {
        ColumnType::Str
    }
}

/// Resolve every column seen in at least one batch. Runs once, after all
/// batch schemas have been observed. Conflicted columns are logged once each
/// with the observed set and the winner.
pub fn resolve_schemas(
    observed: &BTreeMap<String, BTreeSet<ColumnType>>,
) -> BTreeMap<String, ColumnType> {
    let mut resolved = BTreeMap::new();
    let mut conflicts: Vec<String> = Vec::new();
    for (col, types) in observed {
        let target = resolve_column_type(types);
        if types.len() > 1 {
            let names: Vec<&str> = types.iter().map(|t| t.name()).collect();
            conflicts.push(format!("{}: {{{}}} -> {}", col, names.join(", "), target.name()));
        }
        resolved.insert(col.clone(), target);
    }
    if !conflicts.is_empty() {
        tracing::warn!("Type conflicts detected in {} columns:", conflicts.len());
        for line in &conflicts {
            tracing::warn!("  - {}", line);
        }
    }
    resolved
}
