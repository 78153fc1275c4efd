use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{PatchOp, PatchOperation};

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Patch path '{0}' is not a field path")]
    InvalidPath(String),

    #[error("Patch path '{0}' does not name a field")]
    UnknownField(String),

    #[error("Patch test failed at '{path}': expected {expected}, found {actual}")]
    TestFailed {
        path: String,
        expected: Value,
        actual: Value,
    },

    #[error("Patch target must be an object")]
    NotAnObject,

    #[error("Patched document is invalid: {0}")]
    InvalidDocument(String),
}

/// Applies `operations` in order to a copy of `document`.
///
/// Paths address top-level fields and are matched case-insensitively, so
/// `/Name` and `/name` are the same field. Nothing is returned unless every
/// operation succeeds and the result still deserializes into `D`.
pub fn apply_patch<D>(document: &D, operations: &[PatchOperation]) -> Result<D, PatchError>
where
    D: Serialize + DeserializeOwned,
{
    let mut value =
        serde_json::to_value(document).map_err(|e| PatchError::InvalidDocument(e.to_string()))?;

    {
        let fields = value.as_object_mut().ok_or(PatchError::NotAnObject)?;
        for operation in operations {
            apply_operation(fields, operation)?;
        }
    }

    serde_json::from_value(value).map_err(|e| PatchError::InvalidDocument(e.to_string()))
}

fn apply_operation(fields: &mut Map<String, Value>, operation: &PatchOperation) -> Result<(), PatchError> {
    let field = resolve_field(fields, &operation.path)?;

    match operation.op {
        PatchOp::Add | PatchOp::Replace => {
            fields.insert(field, operation.value.clone());
        }
        PatchOp::Remove => {
            fields.insert(field, Value::Null);
        }
        PatchOp::Test => {
            let actual = fields.get(&field).cloned().unwrap_or(Value::Null);
            if !values_equal(&actual, &operation.value) {
                return Err(PatchError::TestFailed {
                    path: operation.path.clone(),
                    expected: operation.value.clone(),
                    actual,
                });
            }
        }
    }

    Ok(())
}

fn resolve_field(fields: &Map<String, Value>, path: &str) -> Result<String, PatchError> {
    let token = path
        .strip_prefix('/')
        .filter(|token| !token.is_empty() && !token.contains('/'))
        .ok_or_else(|| PatchError::InvalidPath(path.to_string()))?;
    let name = token.replace("~1", "/").replace("~0", "~");

    fields
        .keys()
        .find(|key| key.eq_ignore_ascii_case(&name))
        .cloned()
        .ok_or_else(|| PatchError::UnknownField(path.to_string()))
}

// 100 and 100.0 are the same value for a test operation.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Listing {
        id: i32,
        name: String,
        rate: f64,
        image_url: Option<String>,
    }

    fn listing() -> Listing {
        Listing {
            id: 1,
            name: "Pool View".to_string(),
            rate: 200.0,
            image_url: Some("https://img/pool.jpg".to_string()),
        }
    }

    #[test]
    fn test_replace_matches_field_case_insensitively() {
        let patched = apply_patch(&listing(), &[PatchOperation::replace("/Name", "Sea View")]).unwrap();
        assert_eq!(patched.name, "Sea View");
        assert_eq!(patched.id, 1);
    }

    #[test]
    fn test_operations_apply_in_order() {
        let operations = vec![
            PatchOperation::replace("/name", "First"),
            PatchOperation::test("/name", "First"),
            PatchOperation::add("/name", "Second"),
            PatchOperation::replace("/rate", 150),
        ];
        let patched = apply_patch(&listing(), &operations).unwrap();
        assert_eq!(patched.name, "Second");
        assert_eq!(patched.rate, 150.0);
    }

    #[test]
    fn test_remove_clears_optional_field() {
        let patched = apply_patch(&listing(), &[PatchOperation::remove("/imageUrl")]).unwrap();
        assert_eq!(patched.image_url, None);
    }

    #[test]
    fn test_remove_of_required_field_is_rejected() {
        let err = apply_patch(&listing(), &[PatchOperation::remove("/name")]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidDocument(_)));
    }

    #[test]
    fn test_unknown_field_fails_whole_patch() {
        let operations = vec![
            PatchOperation::replace("/name", "Changed"),
            PatchOperation::replace("/owner", "someone"),
        ];
        let err = apply_patch(&listing(), &operations).unwrap_err();
        assert!(matches!(err, PatchError::UnknownField(ref p) if p == "/owner"));
    }

    #[test]
    fn test_nested_and_malformed_paths_are_rejected() {
        for path in ["name", "/", "/name/first", ""] {
            let err = apply_patch(&listing(), &[PatchOperation::replace(path, "x")]).unwrap_err();
            assert!(matches!(err, PatchError::InvalidPath(_)), "path {:?}", path);
        }
    }

    #[test]
    fn test_failed_test_operation_reports_values() {
        let err = apply_patch(&listing(), &[PatchOperation::test("/name", "Beach View")]).unwrap_err();
        match err {
            PatchError::TestFailed { expected, actual, .. } => {
                assert_eq!(expected, json!("Beach View"));
                assert_eq!(actual, json!("Pool View"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_numeric_test_ignores_integer_float_distinction() {
        assert!(apply_patch(&listing(), &[PatchOperation::test("/rate", 200)]).is_ok());
    }

    #[test]
    fn test_wrong_value_type_is_rejected() {
        let err = apply_patch(&listing(), &[PatchOperation::replace("/rate", "cheap")]).unwrap_err();
        assert!(matches!(err, PatchError::InvalidDocument(_)));
    }

    #[test]
    fn test_empty_patch_returns_equal_document() {
        assert_eq!(apply_patch(&listing(), &[]).unwrap(), listing());
    }

    #[test]
    fn test_patch_document_wire_format() {
        let operations: Vec<PatchOperation> = serde_json::from_value(json!([
            {"op": "replace", "path": "/name", "value": "Sea View"},
            {"op": "remove", "path": "/imageUrl"}
        ]))
        .unwrap();
        assert_eq!(operations[0], PatchOperation::replace("/name", "Sea View"));
        assert_eq!(operations[1], PatchOperation::remove("/imageUrl"));
    }
}
