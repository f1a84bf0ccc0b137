//! Cell value helpers
//!
//! Row fields are plain `serde_json::Value`s. This module defines how they
//! are ordered for sorting and how they are turned into display text.

use serde_json::Value;
use std::cmp::Ordering;

/// Ordering class of a value. Values of different classes never compare
/// "less than" each other the way same-class values do, so the class is
/// used as the primary key to keep the sort a total order.
fn class_rank(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Number(_)) => 0,
        Some(Value::String(_)) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Array(_)) | Some(Value::Object(_)) => 3,
        Some(Value::Null) | None => 4,
    }
}

/// Compare two (possibly missing) cell values in ascending order.
///
/// Numbers compare numerically, strings by code point and booleans with
/// `false < true`. Arrays, objects, nulls and missing values compare equal
/// within their class, which keeps their input order under a stable sort.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (rank_a, rank_b) = (class_rank(a), class_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Stringify a value for display. Null and missing values render empty.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_numerically() {
        let (a, b) = (json!(9), json!(10));
        assert_eq!(compare_values(Some(&a), Some(&b)), Ordering::Less);

        let (a, b) = (json!(2.5), json!(2));
        assert_eq!(compare_values(Some(&a), Some(&b)), Ordering::Greater);
    }

    #[test]
    fn test_strings_compare_lexically() {
        let (a, b) = (json!("apple"), json!("banana"));
        assert_eq!(compare_values(Some(&a), Some(&b)), Ordering::Less);
        assert_eq!(compare_values(Some(&a), Some(&a)), Ordering::Equal);
    }

    #[test]
    fn test_missing_and_null_sort_after_everything() {
        let n = json!(1);
        let null = Value::Null;
        assert_eq!(compare_values(None, Some(&n)), Ordering::Greater);
        assert_eq!(compare_values(Some(&null), None), Ordering::Equal);
    }

    #[test]
    fn test_mixed_classes_order_by_class() {
        let (n, s, b) = (json!(100), json!("1"), json!(true));
        assert_eq!(compare_values(Some(&n), Some(&s)), Ordering::Less);
        assert_eq!(compare_values(Some(&s), Some(&b)), Ordering::Less);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(Some(&json!("Alice"))), "Alice");
        assert_eq!(display_value(Some(&json!(42))), "42");
        assert_eq!(display_value(Some(&json!(false))), "false");
        assert_eq!(display_value(Some(&Value::Null)), "");
        assert_eq!(display_value(None), "");
    }
}
