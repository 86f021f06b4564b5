//! Patch synthesis from decoded mutation records.

use crate::decoder::{MutationKind, MutationRecord};
use flare_patch::{path, Patch, PatchOp};

impl MutationRecord {
    /// Normalize this record into a canonical patch.
    ///
    /// The JSON literal `null` always means removal, whatever the event. A
    /// `patch` event merges fields into the object at its path, which is
    /// modeled uniformly as `Add`. For `put`, the last path segment decides:
    /// the append marker `-` adds to a sequence, while the root, a
    /// positional index and a named field are all whole-value replaces. The
    /// store expresses "set element at index" as a put-by-index, which a
    /// mirror applies as a positional overwrite, not an insert.
    pub fn to_patch(&self) -> Patch {
        if self.data == "null" {
            return Patch::remove(&self.path);
        }
        let op = match self.event {
            MutationKind::Patch => PatchOp::Add,
            MutationKind::Put => match path::last_segment(&self.path) {
                "-" => PatchOp::Add,
                _ => PatchOp::Replace,
            },
        };
        Patch::new(op, &self.path, Some(self.data.clone()))
    }
}
