//! Error types for patch resolution and application.

use crate::PatchOp;
use thiserror::Error;

/// Result type alias for node-level operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Failure raised by a [`PatchTarget`](crate::PatchTarget) while resolving
/// or mutating a single node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The segment does not name a declared field on the target type.
    #[error("no field '{field}' declared on {type_name}")]
    UnknownField {
        /// The segment that failed to resolve.
        field: String,
        /// Name of the type it was resolved against.
        type_name: &'static str,
    },

    /// A list operation addressed an index outside the permitted range.
    #[error("cannot {op} element at index {index} (len: {len})")]
    OutOfRange {
        /// The operation that was attempted.
        op: &'static str,
        /// The index that was addressed.
        index: usize,
        /// The actual length of the sequence.
        len: usize,
    },

    /// A list segment that is neither a decimal index nor the append marker.
    #[error("'{segment}' is not a list index")]
    InvalidIndex {
        /// The offending segment.
        segment: String,
    },

    /// An operation/classification combination this engine does not define.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// The payload failed to decode as the declared type.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl NodeError {
    /// Create an unknown field error.
    #[inline]
    pub fn unknown_field(field: &str, type_name: &'static str) -> Self {
        NodeError::UnknownField {
            field: field.to_owned(),
            type_name,
        }
    }

    /// Create an index out of range error.
    #[inline]
    pub fn out_of_range(op: &'static str, index: usize, len: usize) -> Self {
        NodeError::OutOfRange { op, index, len }
    }

    /// Create an invalid list index error.
    #[inline]
    pub fn invalid_index(segment: &str) -> Self {
        NodeError::InvalidIndex {
            segment: segment.to_owned(),
        }
    }

    /// Create an unsupported operation error.
    #[inline]
    pub fn unsupported(detail: impl Into<String>) -> Self {
        NodeError::Unsupported(detail.into())
    }

    /// Attach the patch context this failure occurred under.
    pub fn at(self, op: PatchOp, path: &str) -> PatchError {
        PatchError {
            op,
            path: path.to_owned(),
            source: self,
        }
    }
}

/// A patch that could not be applied, with the patch context attached.
///
/// A failed patch is fatal for the document it targeted: skipping it would
/// silently desynchronize the local mirror from the remote tree.
#[derive(Debug, Error)]
#[error("cannot apply {op} at '{path}': {source}")]
pub struct PatchError {
    /// The operation of the failing patch.
    pub op: PatchOp,
    /// The full path of the failing patch.
    pub path: String,
    /// What went wrong at the target node.
    #[source]
    pub source: NodeError,
}
