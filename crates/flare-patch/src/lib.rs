//! Canonical patch model and typed patch application.
//!
//! The change stream normalizes vendor mutations into [`Patch`] values
//! (add/replace/remove plus a slash-delimited path and a raw JSON payload).
//! This crate applies those patches to statically-typed object graphs
//! through the [`PatchTarget`] capability trait: records expose declared
//! fields, maps merge entries, sequences splice by index or the `-` append
//! marker, and unset intermediate containers materialize on first write.
//!
//! # Quick Start
//!
//! ```
//! use flare_patch::{apply, Patch, PatchOp};
//! use std::collections::HashMap;
//!
//! let mut scores: HashMap<String, i64> = HashMap::new();
//!
//! let patch = Patch::new(PatchOp::Add, "/alice", Some("3".into()));
//! apply(&mut scores, &patch).unwrap();
//!
//! assert_eq!(scores["alice"], 3);
//! ```
//!
//! Structs become patchable with the derive macro (feature `derive`):
//!
//! ```ignore
//! use flare_patch::PatchTarget;
//! use serde::Deserialize;
//!
//! #[derive(Default, Deserialize, PatchTarget)]
//! struct Profile {
//!     name: String,
//!     tags: Vec<String>,
//! }
//! ```

mod apply;
mod error;
mod node;
mod patch;
pub mod path;
mod resolve;

pub use apply::apply;
pub use error::{NodeError, NodeResult, PatchError};
pub use node::{assign_from_json, Container, ListIndex, PatchTarget};
pub use patch::{Patch, PatchOp};
pub use resolve::{classify, Classification};

// Re-export the derive macro when the feature is enabled
#[cfg(feature = "derive")]
pub use flare_patch_derive::PatchTarget;
