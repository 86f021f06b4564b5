//! Recursive patch application over typed object graphs.

use crate::error::{NodeError, PatchError};
use crate::node::{ListIndex, PatchTarget};
use crate::resolve::{classify, Classification};
use crate::{path, Patch, PatchOp};

/// Apply one canonical patch to `root`, mutating it in place.
///
/// Descends one container level per path segment, materializing unset
/// intermediate fields on the way down. Failures carry the patch context;
/// callers must treat them as fatal for the mirrored document rather than
/// skip the patch, since later patches may depend on this one.
pub fn apply<T: PatchTarget>(root: &mut T, patch: &Patch) -> Result<(), PatchError> {
    let segments = path::segments(patch.path());
    descend(root, &segments, true, patch).map_err(|e| e.at(patch.op(), patch.path()))
}

fn descend(
    node: &mut dyn PatchTarget,
    segments: &[&str],
    root_level: bool,
    patch: &Patch,
) -> Result<(), NodeError> {
    let (segment, rest) = segments
        .split_first()
        .expect("a path always yields at least one segment");
    let classification = classify(node.container(), segment);

    if !rest.is_empty() {
        // Only declared fields can be descended through; the protocol never
        // addresses nested containers below a map or list segment.
        return match classification {
            Classification::Property => descend(node.field_mut(segment)?, rest, false, patch),
            other => Err(NodeError::unsupported(format!(
                "{} segment '{segment}' before the end of the path",
                other.as_str()
            ))),
        };
    }

    match classification {
        Classification::Root if root_level => node.assign(patch.op(), patch.data()),
        Classification::Root => Err(NodeError::unsupported("empty interior path segment")),
        Classification::Property => node.field_mut(segment)?.assign(patch.op(), patch.data()),
        Classification::DictionaryEntry => match patch.op() {
            PatchOp::Remove => Err(NodeError::unsupported(format!(
                "remove of dictionary entry '{segment}'"
            ))),
            _ => node.merge_entry(segment, patch.data()),
        },
        Classification::ListEntry => {
            node.splice_index(ListIndex::parse(segment)?, patch.op(), patch.data())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeError;
    use std::collections::HashMap;

    #[test]
    fn test_root_replace() {
        let mut doc: HashMap<String, i64> = HashMap::new();
        let patch = Patch::new(PatchOp::Replace, "/", Some(r#"{"a":1}"#.into()));
        apply(&mut doc, &patch).unwrap();
        assert_eq!(doc["a"], 1);
    }

    #[test]
    fn test_root_remove_resets() {
        let mut doc: HashMap<String, i64> = HashMap::from([("a".into(), 1)]);
        apply(&mut doc, &Patch::remove("/")).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_dictionary_entry_merges_single_key() {
        let mut doc: HashMap<String, i64> = HashMap::from([("k0".into(), 0)]);
        let patch = Patch::new(PatchOp::Replace, "/k1", Some("1".into()));
        apply(&mut doc, &patch).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc["k0"], 0);
        assert_eq!(doc["k1"], 1);
    }

    #[test]
    fn test_dictionary_entry_remove_is_unsupported() {
        let mut doc: HashMap<String, i64> = HashMap::from([("k0".into(), 0)]);
        let err = apply(&mut doc, &Patch::remove("/k0")).unwrap_err();
        assert!(matches!(err.source, NodeError::Unsupported(_)));
        assert!(err.to_string().contains("dictionary entry"));
    }

    #[test]
    fn test_list_entry_by_index() {
        let mut doc: Vec<String> = vec!["a".into(), "b".into()];
        let patch = Patch::new(PatchOp::Replace, "/1", Some("\"c\"".into()));
        apply(&mut doc, &patch).unwrap();
        assert_eq!(doc, vec!["a", "c"]);
    }

    #[test]
    fn test_list_entry_bad_segment() {
        let mut doc: Vec<String> = vec![];
        let patch = Patch::new(PatchOp::Replace, "/first", Some("\"c\"".into()));
        let err = apply(&mut doc, &patch).unwrap_err();
        assert!(matches!(err.source, NodeError::InvalidIndex { .. }));
    }

    #[test]
    fn test_intermediate_list_segment_is_unsupported() {
        let mut doc: Vec<Vec<i64>> = vec![vec![1]];
        let patch = Patch::new(PatchOp::Replace, "/0/0", Some("2".into()));
        let err = apply(&mut doc, &patch).unwrap_err();
        assert!(matches!(err.source, NodeError::Unsupported(_)));
        assert!(err.to_string().contains("list entry"));
    }

    #[test]
    fn test_error_carries_patch_context() {
        let mut doc: Vec<i64> = vec![];
        let patch = Patch::new(PatchOp::Replace, "/4", Some("1".into()));
        let err = apply(&mut doc, &patch).unwrap_err();
        assert_eq!(err.path, "/4");
        assert_eq!(err.op, PatchOp::Replace);
    }
}
