//! Canonical patch operations.
//!
//! The change stream's `put`/`patch` vocabulary is normalized into a small
//! add/replace/remove operation set with RFC 6902-style path semantics,
//! independent of the wire protocol's event names.

use crate::path;
use serde_json::Value;
use std::fmt;

/// Operation kind of a canonical patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatchOp {
    /// Insert or merge at the target location.
    Add,
    /// Overwrite the target location.
    Replace,
    /// Delete the target location.
    Remove,
}

impl PatchOp {
    /// RFC 6902 operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOp::Add => "add",
            PatchOp::Replace => "replace",
            PatchOp::Remove => "remove",
        }
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized mutation: operation, root-relative path, raw JSON payload.
///
/// The path always carries exactly one leading slash. A `Remove` never
/// carries a payload; the constructors enforce the invariant, so removal is
/// expressed by the operation alone and can never be confused with
/// "replace with JSON `null`". Equality compares the parsed payloads
/// structurally, so formatting differences in the raw text do not matter.
#[derive(Clone, Debug)]
pub struct Patch {
    op: PatchOp,
    path: String,
    data: Option<String>,
}

impl Patch {
    /// Build a patch, normalizing the path and the remove/payload invariant.
    pub fn new(op: PatchOp, path: &str, data: Option<String>) -> Self {
        let data = match op {
            PatchOp::Remove => None,
            _ => data,
        };
        Self {
            op,
            path: path::normalize(path),
            data,
        }
    }

    /// A removal at `path`.
    pub fn remove(path: &str) -> Self {
        Self::new(PatchOp::Remove, path, None)
    }

    /// The operation kind.
    pub fn op(&self) -> PatchOp {
        self.op
    }

    /// The normalized target path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw JSON payload text; `None` for removals.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Parsed payload; `Null` for removals.
    pub fn data_value(&self) -> Result<Value, serde_json::Error> {
        match &self.data {
            Some(raw) => serde_json::from_str(raw),
            None => Ok(Value::Null),
        }
    }
}

impl PartialEq for Patch {
    fn eq(&self, other: &Self) -> bool {
        if self.op != other.op || self.path != other.path {
            return false;
        }
        match (self.data_value(), other.data_value()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.data == other.data,
        }
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data_value().unwrap_or(Value::Null);
        let rendered = serde_json::json!({
            "op": self.op.as_str(),
            "path": self.path,
            "data": data,
        });
        write!(f, "{rendered}")
    }
}
