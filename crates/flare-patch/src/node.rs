//! Patch target capability model.
//!
//! Runtime member reflection is replaced by a small per-type capability
//! trait: each patchable type reports how path segments resolve inside it
//! and exposes the handful of mutations the applier needs. Collections and
//! scalars get impls here; named structs derive theirs with
//! `#[derive(PatchTarget)]` from `flare-patch-derive`.

use crate::error::{NodeError, NodeResult};
use crate::PatchOp;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};

/// How path segments resolve inside a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// Named, declared fields.
    Record,
    /// Key-value associative container.
    Map,
    /// Ordered, indexable sequence.
    List,
    /// No inner structure addressable by path.
    Scalar,
}

/// Index addressed by the terminal segment of a list path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListIndex {
    /// The append marker `-`: insert after the last element.
    Append,
    /// A zero-based position.
    At(usize),
}

impl ListIndex {
    /// Parse a path segment addressed at an ordered sequence.
    pub fn parse(segment: &str) -> NodeResult<Self> {
        if segment == "-" {
            return Ok(ListIndex::Append);
        }
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            segment
                .parse()
                .map(ListIndex::At)
                .map_err(|_| NodeError::invalid_index(segment))
        } else {
            Err(NodeError::invalid_index(segment))
        }
    }
}

/// Mutation capabilities of one node in a patchable object graph.
///
/// Methods a concrete container kind does not support carry default bodies
/// returning the matching error, so impls only define what their shape
/// allows.
pub trait PatchTarget {
    /// How path segments resolve inside this value.
    fn container(&self) -> Container {
        Container::Scalar
    }

    /// Mutable access to the declared field `segment`, materializing unset
    /// optional fields with their default value.
    fn field_mut(&mut self, segment: &str) -> NodeResult<&mut dyn PatchTarget> {
        Err(NodeError::unknown_field(
            segment,
            std::any::type_name::<Self>(),
        ))
    }

    /// Overwrite this value from a raw JSON payload. `None` resets to the
    /// zero value.
    fn assign(&mut self, op: PatchOp, data: Option<&str>) -> NodeResult<()>;

    /// Merge a single `key -> payload` entry into an associative value.
    fn merge_entry(&mut self, key: &str, data: Option<&str>) -> NodeResult<()> {
        let _ = data;
        Err(NodeError::unsupported(format!(
            "entry '{key}' on a non-associative value"
        )))
    }

    /// Indexed insert/overwrite/delete on an ordered sequence.
    fn splice_index(&mut self, index: ListIndex, op: PatchOp, data: Option<&str>) -> NodeResult<()> {
        let _ = (index, data);
        Err(NodeError::unsupported(format!(
            "{op} by index on a non-sequence value"
        )))
    }
}

/// Assignment shared by leaf impls and the derive macro: no payload resets
/// the slot to its default, anything else decodes in place.
pub fn assign_from_json<T>(slot: &mut T, data: Option<&str>) -> NodeResult<()>
where
    T: DeserializeOwned + Default,
{
    match data {
        None => {
            *slot = T::default();
            Ok(())
        }
        Some(raw) => {
            *slot = serde_json::from_str(raw)?;
            Ok(())
        }
    }
}

macro_rules! scalar_target {
    ($($ty:ty),* $(,)?) => {$(
        impl PatchTarget for $ty {
            fn assign(&mut self, _op: PatchOp, data: Option<&str>) -> NodeResult<()> {
                assign_from_json(self, data)
            }
        }
    )*};
}

scalar_target!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String);

impl<T: DeserializeOwned> PatchTarget for Vec<T> {
    fn container(&self) -> Container {
        Container::List
    }

    fn assign(&mut self, _op: PatchOp, data: Option<&str>) -> NodeResult<()> {
        let Some(raw) = data else {
            self.clear();
            return Ok(());
        };
        let decoded: Vec<T> = serde_json::from_str(raw)?;
        // The store cannot represent an empty sequence distinctly from an
        // absent one; replacing empty with empty must not oscillate the
        // field between the two.
        if decoded.is_empty() && self.is_empty() {
            return Ok(());
        }
        *self = decoded;
        Ok(())
    }

    fn splice_index(&mut self, index: ListIndex, op: PatchOp, data: Option<&str>) -> NodeResult<()> {
        match op {
            PatchOp::Add => {
                let item: T = serde_json::from_str(data.unwrap_or("null"))?;
                let at = match index {
                    ListIndex::Append => self.len(),
                    ListIndex::At(at) => at,
                };
                if at < self.len() {
                    self.insert(at, item);
                } else if at == self.len() {
                    self.push(item);
                } else {
                    return Err(NodeError::out_of_range("add", at, self.len()));
                }
                Ok(())
            }
            PatchOp::Replace => {
                let ListIndex::At(at) = index else {
                    return Err(NodeError::unsupported(
                        "append marker '-' with a replace operation",
                    ));
                };
                let item: T = serde_json::from_str(data.unwrap_or("null"))?;
                if at < self.len() {
                    self[at] = item;
                } else if at == self.len() {
                    self.push(item);
                } else {
                    return Err(NodeError::out_of_range("replace", at, self.len()));
                }
                Ok(())
            }
            PatchOp::Remove => {
                let ListIndex::At(at) = index else {
                    return Err(NodeError::unsupported(
                        "append marker '-' with a remove operation",
                    ));
                };
                if at < self.len() {
                    self.remove(at);
                    Ok(())
                } else {
                    Err(NodeError::out_of_range("remove", at, self.len()))
                }
            }
        }
    }
}

macro_rules! map_target {
    ($($map:ident),* $(,)?) => {$(
        impl<V: DeserializeOwned> PatchTarget for $map<String, V> {
            fn container(&self) -> Container {
                Container::Map
            }

            fn assign(&mut self, op: PatchOp, data: Option<&str>) -> NodeResult<()> {
                let Some(raw) = data else {
                    self.clear();
                    return Ok(());
                };
                let decoded: $map<String, V> = serde_json::from_str(raw)?;
                // Merge in place rather than swapping the container out, so
                // references held elsewhere keep seeing the updated entries.
                if op == PatchOp::Replace {
                    self.clear();
                }
                for (key, value) in decoded {
                    self.insert(key, value);
                }
                Ok(())
            }

            fn merge_entry(&mut self, key: &str, data: Option<&str>) -> NodeResult<()> {
                let payload = data.unwrap_or("null");
                let wrapped = format!("{{{}:{}}}", serde_json::to_string(key)?, payload);
                let decoded: $map<String, V> = serde_json::from_str(&wrapped)?;
                for (key, value) in decoded {
                    self.insert(key, value);
                }
                Ok(())
            }
        }
    )*};
}

map_target!(HashMap, BTreeMap);

impl<T: PatchTarget + Default> PatchTarget for Option<T> {
    fn container(&self) -> Container {
        match self {
            Some(value) => value.container(),
            None => T::default().container(),
        }
    }

    fn field_mut(&mut self, segment: &str) -> NodeResult<&mut dyn PatchTarget> {
        self.get_or_insert_with(T::default).field_mut(segment)
    }

    fn assign(&mut self, op: PatchOp, data: Option<&str>) -> NodeResult<()> {
        match data {
            None => {
                *self = None;
                Ok(())
            }
            // JSON null clears an optional field rather than failing to
            // decode into the inner type.
            Some(raw) if raw.trim() == "null" => {
                *self = None;
                Ok(())
            }
            Some(_) => self.get_or_insert_with(T::default).assign(op, data),
        }
    }

    fn merge_entry(&mut self, key: &str, data: Option<&str>) -> NodeResult<()> {
        self.get_or_insert_with(T::default).merge_entry(key, data)
    }

    fn splice_index(&mut self, index: ListIndex, op: PatchOp, data: Option<&str>) -> NodeResult<()> {
        self.get_or_insert_with(T::default).splice_index(index, op, data)
    }
}
