use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Test,
}

/// One entry of a JSON Patch document, e.g.
/// `{"op": "replace", "path": "/name", "value": "Pool View"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    /// Missing and explicit `null` both mean null.
    #[serde(default)]
    pub value: Value,
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            value: Value::Null,
        }
    }

    pub fn test(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            op: PatchOp::Test,
            path: path.into(),
            value: value.into(),
        }
    }
}
