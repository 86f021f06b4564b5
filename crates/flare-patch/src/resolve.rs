//! Path segment classification.

use crate::node::Container;

/// What a path segment addresses inside its enclosing container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// The empty first segment of a root-level patch.
    Root,
    /// A declared field on a record type.
    Property,
    /// An entry of an associative container.
    DictionaryEntry,
    /// An element of an ordered sequence.
    ListEntry,
}

impl Classification {
    /// Human-readable name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Root => "root",
            Classification::Property => "property",
            Classification::DictionaryEntry => "dictionary entry",
            Classification::ListEntry => "list entry",
        }
    }
}

/// Classify one path segment against the container it resolves in.
///
/// Associativity wins over everything else: inside a map every segment is a
/// key and inside a list every segment is an index, whatever its shape. Only
/// the empty segment of the root path classifies as `Root`; all remaining
/// names are treated as declared fields, whose existence the target itself
/// checks on access.
pub fn classify(container: Container, segment: &str) -> Classification {
    match container {
        Container::Map => Classification::DictionaryEntry,
        Container::List => Classification::ListEntry,
        _ if segment.is_empty() => Classification::Root,
        _ => Classification::Property,
    }
}
