//! Condition evaluation for conditional branches

use crate::types::action::{Condition, Predicate};
use crate::types::state::VariableStore;
use crate::types::value::Value;

/// Evaluate a `conditional` payload against one scope.
pub fn evaluate_condition(condition: &Condition, scope: &VariableStore, is_day: bool) -> bool {
    let stored = condition.var.as_deref().and_then(|name| scope.get(name));
    evaluate(condition.condition, stored, &condition.value, is_day)
}

/// Evaluate a predicate. Never fails: incompatible operands make the
/// comparison false (or true for `not_equal`).
pub fn evaluate(predicate: Predicate, stored: Option<&Value>, expected: &Value, is_day: bool) -> bool {
    let stored = stored.filter(|v| !v.is_null());
    let expected = Some(expected).filter(|v| !v.is_null());

    match predicate {
        Predicate::Equal => match (stored, expected) {
            (Some(a), Some(b)) => values_equal(a, b),
            _ => false,
        },
        Predicate::NotEqual => match (stored, expected) {
            (Some(a), Some(b)) => !values_equal(a, b),
            _ => true,
        },
        Predicate::LessThan => numbers(stored, expected).is_some_and(|(a, b)| a < b),
        Predicate::GreaterThan => numbers(stored, expected).is_some_and(|(a, b)| a > b),
        Predicate::Day => is_day,
        Predicate::Night => !is_day,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn numbers(a: Option<&Value>, b: Option<&Value>) -> Option<(f64, f64)> {
    Some((a?.as_number()?, b?.as_number()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn numeric_equality_ignores_integer_float_spelling() {
        assert!(evaluate(Predicate::Equal, Some(&num(5.0)), &num(5.0), true));
        let parsed: Value = serde_json::from_str("5.0").unwrap();
        let int: Value = serde_json::from_str("5").unwrap();
        assert!(evaluate(Predicate::Equal, Some(&int), &parsed, true));
    }

    #[test]
    fn null_operands_make_equal_false_and_not_equal_true() {
        assert!(!evaluate(Predicate::Equal, None, &num(1.0), true));
        assert!(!evaluate(Predicate::Equal, Some(&num(1.0)), &Value::Null, true));
        assert!(!evaluate(Predicate::Equal, None, &Value::Null, true));
        assert!(evaluate(Predicate::NotEqual, None, &num(1.0), true));
        assert!(evaluate(Predicate::NotEqual, Some(&Value::Null), &Value::Null, true));
    }

    #[test]
    fn non_numeric_values_compare_structurally() {
        let name = Value::from("mira");
        assert!(evaluate(Predicate::Equal, Some(&name), &Value::from("mira"), true));
        assert!(evaluate(Predicate::NotEqual, Some(&name), &Value::from("kai"), true));
        assert!(!evaluate(Predicate::Equal, Some(&name), &num(1.0), true));
        assert!(evaluate(Predicate::Equal, Some(&Value::Bool(true)), &Value::Bool(true), true));
    }

    #[test]
    fn ordering_requires_two_numbers() {
        assert!(evaluate(Predicate::LessThan, Some(&num(1.0)), &num(2.0), true));
        assert!(!evaluate(Predicate::LessThan, Some(&num(2.0)), &num(2.0), true));
        assert!(evaluate(Predicate::GreaterThan, Some(&num(3.0)), &num(2.5), true));
        assert!(!evaluate(Predicate::GreaterThan, Some(&Value::from("9")), &num(1.0), true));
        assert!(!evaluate(Predicate::LessThan, None, &num(1.0), true));
    }

    #[test]
    fn day_and_night_follow_the_session_flag() {
        assert!(evaluate(Predicate::Day, None, &Value::Null, true));
        assert!(!evaluate(Predicate::Night, None, &Value::Null, true));
        assert!(evaluate(Predicate::Night, None, &Value::Null, false));
    }

    #[test]
    fn reads_the_named_variable_from_scope() {
        let mut scope = VariableStore::new();
        scope.set("gold", num(5.0));
        let condition = Condition {
            var: Some("gold".to_string()),
            condition: Predicate::GreaterThan,
            value: num(3.0),
            end: 0,
        };
        assert!(evaluate_condition(&condition, &scope, true));
        assert!(!evaluate_condition(&condition, &VariableStore::new(), true));
    }
}
