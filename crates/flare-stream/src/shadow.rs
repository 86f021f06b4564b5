//! Optional in-memory mirror of observed leaf values.
//!
//! Mirrors previously seen leaves keyed by path so consumers can receive
//! value-level added/changed/removed events independent of patch semantics.
//! Nodes live in an arena and refer to their parent by index; the arena is
//! guarded by a mutex around each traversal.
//!
//! The tree is not wired into the stream pipeline: connect it through
//! [`StreamHooks::on_record`](crate::StreamHooks::on_record) with
//! [`ShadowTree::apply_record`] when value-level events are wanted.

use crate::decoder::{MutationKind, MutationRecord};
use serde_json::Value;
use std::sync::Mutex;

/// Leaf added callback: path and the new value.
pub type ValueAddedHook = Box<dyn Fn(&str, &Value) + Send + Sync>;
/// Leaf changed callback: path, new value, old value.
pub type ValueChangedHook = Box<dyn Fn(&str, &Value, &Value) + Send + Sync>;
/// Leaf removed callback: path.
pub type ValueRemovedHook = Box<dyn Fn(&str) + Send + Sync>;

/// Callback registrations for one shadow tree, fixed at construction.
#[derive(Default)]
pub struct ShadowHooks {
    on_added: Vec<ValueAddedHook>,
    on_changed: Vec<ValueChangedHook>,
    on_removed: Vec<ValueRemovedHook>,
}

impl ShadowHooks {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe leaves written for the first time.
    pub fn on_added(mut self, hook: impl Fn(&str, &Value) + Send + Sync + 'static) -> Self {
        self.on_added.push(Box::new(hook));
        self
    }

    /// Observe leaves written again; old value included.
    pub fn on_changed(
        mut self,
        hook: impl Fn(&str, &Value, &Value) + Send + Sync + 'static,
    ) -> Self {
        self.on_changed.push(Box::new(hook));
        self
    }

    /// Observe removed paths.
    pub fn on_removed(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_removed.push(Box::new(hook));
        self
    }
}

const ROOT: usize = 0;

#[derive(Debug, Default)]
struct Node {
    name: String,
    value: Option<Value>,
    parent: Option<usize>,
    children: Vec<usize>,
    created: bool,
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<Node>,
    free: Vec<usize>,
}

impl Arena {
    fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            free: Vec::new(),
        }
    }

    fn alloc(&mut self, name: &str, parent: usize) -> usize {
        let node = Node {
            name: name.to_owned(),
            value: None,
            parent: Some(parent),
            children: Vec::new(),
            created: true,
        };
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn child_named(&self, parent: usize, name: &str) -> Option<usize> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].name == name)
    }

    fn child_or_create(&mut self, parent: usize, name: &str) -> usize {
        match self.child_named(parent, name) {
            Some(child) => child,
            None => {
                let child = self.alloc(name, parent);
                self.nodes[parent].children.push(child);
                child
            }
        }
    }

    fn find_or_create(&mut self, path: &str) -> usize {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(ROOT, |node, segment| self.child_or_create(node, segment))
    }

    fn detach(&mut self, node: usize) {
        if let Some(parent) = self.nodes[node].parent {
            self.nodes[parent].children.retain(|&child| child != node);
        }
        self.release(node);
    }

    fn release(&mut self, node: usize) {
        let children = std::mem::take(&mut self.nodes[node].children);
        for child in children {
            self.release(child);
        }
        self.nodes[node] = Node::default();
        self.free.push(node);
    }

    fn path_of(&self, node: usize) -> String {
        let mut names = Vec::new();
        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            names.push(self.nodes[current].name.clone());
            current = parent;
        }
        if names.is_empty() {
            return "/".to_owned();
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }
}

/// Local mirror of previously observed leaf values.
pub struct ShadowTree {
    arena: Mutex<Arena>,
    hooks: ShadowHooks,
}

impl ShadowTree {
    /// Create an empty mirror with the given hooks.
    pub fn new(hooks: ShadowHooks) -> Self {
        Self {
            arena: Mutex::new(Arena::new()),
            hooks,
        }
    }

    /// Mirror a subtree replacement: leaves missing from `data` are removed,
    /// the rest is written as in [`update`](Self::update).
    pub fn replace(&self, path: &str, data: &Value) {
        let mut arena = self.arena.lock().expect("shadow tree lock");
        let node = arena.find_or_create(path);
        self.write(&mut arena, node, data, true);
    }

    /// Mirror a subtree merge: observed leaves are added or changed, `null`
    /// removes, siblings not mentioned stay untouched.
    pub fn update(&self, path: &str, data: &Value) {
        let mut arena = self.arena.lock().expect("shadow tree lock");
        let node = arena.find_or_create(path);
        self.write(&mut arena, node, data, false);
    }

    /// Mirror one decoded record: `put` replaces, `patch` merges.
    pub fn apply_record(&self, record: &MutationRecord) -> Result<(), serde_json::Error> {
        let data: Value = serde_json::from_str(&record.data)?;
        match record.event {
            MutationKind::Put => self.replace(&record.path, &data),
            MutationKind::Patch => self.update(&record.path, &data),
        }
        Ok(())
    }

    fn write(&self, arena: &mut Arena, node: usize, data: &Value, replace: bool) {
        match data {
            Value::Null => self.remove(arena, node),
            Value::Object(fields) => {
                // A node with children is interior; it holds no leaf value.
                arena.nodes[node].value = None;
                if replace {
                    let stale: Vec<usize> = arena.nodes[node]
                        .children
                        .iter()
                        .copied()
                        .filter(|&child| !fields.contains_key(&arena.nodes[child].name))
                        .collect();
                    for child in stale {
                        self.remove(arena, child);
                    }
                }
                for (name, child_data) in fields {
                    let child = arena.child_or_create(node, name);
                    self.write(arena, child, child_data, replace);
                }
            }
            leaf => {
                let stale = arena.nodes[node].children.clone();
                for child in stale {
                    self.remove(arena, child);
                }
                let path = arena.path_of(node);
                if arena.nodes[node].created {
                    arena.nodes[node].value = Some(leaf.clone());
                    arena.nodes[node].created = false;
                    for hook in &self.hooks.on_added {
                        hook(&path, leaf);
                    }
                } else {
                    let old = arena.nodes[node].value.replace(leaf.clone());
                    let old = old.unwrap_or(Value::Null);
                    for hook in &self.hooks.on_changed {
                        hook(&path, leaf, &old);
                    }
                }
            }
        }
    }

    fn remove(&self, arena: &mut Arena, node: usize) {
        if node == ROOT {
            let children = arena.nodes[ROOT].children.clone();
            if children.is_empty() {
                for hook in &self.hooks.on_removed {
                    hook("/");
                }
                return;
            }
            for child in children {
                let path = arena.path_of(child);
                arena.detach(child);
                for hook in &self.hooks.on_removed {
                    hook(&path);
                }
            }
            return;
        }

        let path = arena.path_of(node);
        let mut ancestor = arena.nodes[node].parent;
        arena.detach(node);
        for hook in &self.hooks.on_removed {
            hook(&path);
        }

        // Collapse valueless, childless ancestors up to the first branching
        // one (or the root).
        while let Some(current) = ancestor {
            if current == ROOT
                || arena.nodes[current].value.is_some()
                || !arena.nodes[current].children.is_empty()
            {
                break;
            }
            ancestor = arena.nodes[current].parent;
            arena.detach(current);
        }
    }
}
