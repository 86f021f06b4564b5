//! Change-stream consumption for a hierarchical JSON document store.
//!
//! The store pushes incremental mutations over a persistent HTTP response:
//! `put` replaces a subtree, `patch` merges fields into one. This crate
//! turns that byte stream into structured events:
//!
//! - [`RecordDecoder`]: pure line state machine producing [`MutationRecord`]s
//! - [`MutationRecord::to_patch`]: normalization into canonical
//!   [`Patch`](flare_patch::Patch) operations
//! - [`StreamObserver`]: cancellable background task driving the pipeline
//!   and delivering patches through [`StreamHooks`]
//! - [`ShadowTree`]: optional value-level mirror emitting
//!   added/changed/removed events
//!
//! Everything but the observer is synchronous and I/O-free; patches are
//! delivered strictly in arrival order.

mod decoder;
mod error;
mod observer;
mod shadow;
mod synth;

pub use decoder::{MutationKind, MutationRecord, RecordDecoder};
pub use error::StreamError;
pub use observer::{
    ErrorHook, LineHook, PatchHook, RawEventHook, RecordHook, RootPatchHook, StreamHooks,
    StreamObserver, StreamState,
};
pub use shadow::{
    ShadowHooks, ShadowTree, ValueAddedHook, ValueChangedHook, ValueRemovedHook,
};
