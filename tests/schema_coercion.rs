use redsift::{
    coerce_cell, detect_language, lenient_float, lenient_int, resolve_column_type, value_type,
    ColumnType, Lang, TextCleaner,
};
use serde_json::json;
use std::collections::BTreeSet;

fn set(types: &[ColumnType]) -> BTreeSet<ColumnType> {
    types.iter().copied().collect()
}

/// Resolution follows the fixed precedence and is a pure function of the
/// *set* of observed types: permuting the observation order changes nothing.
#[test]
fn resolution_precedence_and_order_independence() {
    assert_eq!(resolve_column_type(&set(&[ColumnType::Int, ColumnType::Str])), ColumnType::Str);
    assert_eq!(resolve_column_type(&set(&[ColumnType::Str, ColumnType::Int])), ColumnType::Str);
    assert_eq!(resolve_column_type(&set(&[ColumnType::Int, ColumnType::Float])), ColumnType::Float);
    assert_eq!(resolve_column_type(&set(&[ColumnType::Bool, ColumnType::Int])), ColumnType::Int);
    assert_eq!(resolve_column_type(&set(&[ColumnType::Null, ColumnType::Bool])), ColumnType::Bool);
    assert_eq!(resolve_column_type(&set(&[ColumnType::Null])), ColumnType::Null);
    assert_eq!(
        resolve_column_type(&set(&[ColumnType::Str, ColumnType::Float, ColumnType::Int, ColumnType::Bool])),
        ColumnType::Str
    );
}

#[test]
fn value_types_observe_json_shapes() {
    assert_eq!(value_type(&json!(null)), ColumnType::Null);
    assert_eq!(value_type(&json!(true)), ColumnType::Bool);
    assert_eq!(value_type(&json!(7)), ColumnType::Int);
    assert_eq!(value_type(&json!(7.5)), ColumnType::Float);
    assert_eq!(value_type(&json!("x")), ColumnType::Str);
    // Nested shapes are treated as strings for resolution purposes.
    assert_eq!(value_type(&json!({"a": 1})), ColumnType::Str);
    assert_eq!(value_type(&json!([1, 2])), ColumnType::Str);
}

/// Coercion is total: junk cells degrade to the type default instead of
/// raising, and the output value always matches the target type.
#[test]
fn coercion_never_fails_on_junk() {
    let junk = [
        json!("not a number"),
        json!(""),
        json!(null),
        json!(true),
        json!({"nested": "object"}),
    ];
    for cell in &junk {
        let (as_float, _) = coerce_cell(cell, ColumnType::Float);
        assert!(as_float.is_f64(), "float target must yield a float for {}", cell);
        let (as_int, _) = coerce_cell(cell, ColumnType::Int);
        assert!(as_int.is_i64(), "int target must yield an int for {}", cell);
        let (as_str, _) = coerce_cell(cell, ColumnType::Str);
        assert!(as_str.is_string(), "str target must yield a string for {}", cell);
    }

    assert_eq!(coerce_cell(&json!("garbage"), ColumnType::Float).0, json!(0.0));
    assert_eq!(coerce_cell(&json!("garbage"), ColumnType::Int).0, json!(0));
    assert_eq!(coerce_cell(&json!(null), ColumnType::Float).0, json!(0.0));
    assert_eq!(coerce_cell(&json!(null), ColumnType::Str).0, json!(""));

    // Embedded digits survive the character strip.
    assert_eq!(coerce_cell(&json!("$1,234.56"), ColumnType::Float).0, json!(1234.56));
    assert_eq!(coerce_cell(&json!("-12 points"), ColumnType::Int).0, json!(-12));
    assert_eq!(coerce_cell(&json!(42), ColumnType::Str).0, json!("42"));
}

#[test]
fn lenient_parsers_strip_non_numeric_noise() {
    assert_eq!(lenient_float("  -3.5kg "), Some(-3.5));
    assert_eq!(lenient_float("1,234.5"), Some(1234.5));
    assert_eq!(lenient_float("no digits"), None);
    assert_eq!(lenient_float("1.2.3"), None);
    assert_eq!(lenient_int("score: 99!"), Some(99));
    assert_eq!(lenient_int("-7 below"), Some(-7));
    assert_eq!(lenient_int(""), None);
}

#[test]
fn text_cleaner_strips_urls_and_mentions() {
    let cleaner = TextCleaner::new();
    assert_eq!(
        cleaner.clean("Check THIS https://example.com/x?y=1 out @user and /u/friend  now"),
        "check this out and now"
    );
    assert_eq!(cleaner.clean(""), "");
    assert_eq!(cleaner.clean("   "), "");
    assert_eq!(cleaner.clean("PLAIN text\n\twith   gaps"), "plain text with gaps");
}

/// Empty title+selftext is the "und" case: no language, always rejected.
#[test]
fn empty_text_has_no_language() {
    assert_eq!(detect_language(None, None), None);
    assert_eq!(detect_language(Some("  "), Some("")), None);
    assert_eq!(
        detect_language(Some("The weather in London has been unusually warm this autumn"), None),
        Some(Lang::Eng)
    );
}
