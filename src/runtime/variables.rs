//! Variable creation and mutation

use crate::error::VariableError;
use crate::types::action::ModifyOp;
use crate::types::state::VariableStore;
use crate::types::value::Value;

/// Apply `op` to the variable `name`.
///
/// On error the scope is left untouched.
pub fn modify(
    name: &str,
    op: ModifyOp,
    value: &Value,
    scope: &mut VariableStore,
) -> Result<(), VariableError> {
    match op {
        ModifyOp::Set => {
            scope.set(name, value.clone());
            Ok(())
        }
        ModifyOp::Add => {
            let current = match scope.get(name) {
                None | Some(Value::Null) => 0.0,
                Some(Value::Number(n)) => *n,
                Some(other) => return Err(mismatch(name, "number", other)),
            };
            let delta = value
                .as_number()
                .ok_or_else(|| mismatch(name, "number", value))?;
            let sum = current + delta;
            if !sum.is_finite() {
                return Err(VariableError::NotFinite {
                    variable: name.to_string(),
                });
            }
            scope.set(name, Value::Number(sum));
            Ok(())
        }
        ModifyOp::Append => {
            let mut items = match scope.get(name) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::List(items)) => items.clone(),
                Some(other) => return Err(mismatch(name, "list", other)),
            };
            match value {
                Value::String(s) => items.push(s.clone()),
                Value::List(more) => items.extend(more.iter().cloned()),
                other => return Err(mismatch(name, "string", other)),
            }
            scope.set(name, Value::List(items));
            Ok(())
        }
    }
}

/// Set `name` to `init` only if it does not exist yet.
///
/// Returns whether the variable was created.
pub fn create(name: &str, init: &Value, scope: &mut VariableStore) -> bool {
    if scope.contains(name) {
        return false;
    }
    scope.set(name, init.clone());
    true
}

fn mismatch(name: &str, expected: &'static str, actual: &Value) -> VariableError {
    VariableError::TypeMismatch {
        variable: name.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_treats_missing_as_zero() {
        let mut scope = VariableStore::new();
        modify("gold", ModifyOp::Add, &Value::Number(3.0), &mut scope).unwrap();
        modify("gold", ModifyOp::Add, &Value::Number(2.5), &mut scope).unwrap();
        assert_eq!(scope.get("gold"), Some(&Value::Number(5.5)));
    }

    #[test]
    fn add_on_string_is_a_type_mismatch() {
        let mut scope = VariableStore::new();
        scope.set("name", Value::from("mira"));
        let err = modify("name", ModifyOp::Add, &Value::Number(1.0), &mut scope).unwrap_err();
        assert_eq!(
            err,
            VariableError::TypeMismatch {
                variable: "name".to_string(),
                expected: "number",
                actual: "string",
            }
        );
        assert_eq!(scope.get("name"), Some(&Value::from("mira")));
    }

    #[test]
    fn add_that_overflows_leaves_the_value() {
        let mut scope = VariableStore::new();
        scope.set("gold", Value::Number(f64::MAX));
        let err = modify("gold", ModifyOp::Add, &Value::Number(f64::MAX), &mut scope).unwrap_err();
        assert_eq!(
            err,
            VariableError::NotFinite {
                variable: "gold".to_string()
            }
        );
        assert_eq!(scope.get("gold"), Some(&Value::Number(f64::MAX)));
    }

    #[test]
    fn append_builds_lists() {
        let mut scope = VariableStore::new();
        modify("seen", ModifyOp::Append, &Value::from("a"), &mut scope).unwrap();
        modify(
            "seen",
            ModifyOp::Append,
            &Value::List(vec!["b".to_string(), "c".to_string()]),
            &mut scope,
        )
        .unwrap();
        assert_eq!(
            scope.get("seen").and_then(Value::as_list),
            Some(&["a".to_string(), "b".to_string(), "c".to_string()][..])
        );

        scope.set("count", Value::Number(1.0));
        assert!(modify("count", ModifyOp::Append, &Value::from("x"), &mut scope).is_err());
    }

    #[test]
    fn set_overwrites_any_type() {
        let mut scope = VariableStore::new();
        scope.set("flag", Value::Number(1.0));
        modify("flag", ModifyOp::Set, &Value::Bool(false), &mut scope).unwrap();
        assert_eq!(scope.get("flag"), Some(&Value::Bool(false)));
    }

    #[test]
    fn create_is_idempotent() {
        let mut scope = VariableStore::new();
        assert!(create("met", &Value::Bool(false), &mut scope));
        modify("met", ModifyOp::Set, &Value::Bool(true), &mut scope).unwrap();
        assert!(!create("met", &Value::Bool(false), &mut scope));
        assert_eq!(scope.get("met"), Some(&Value::Bool(true)));
    }
}
