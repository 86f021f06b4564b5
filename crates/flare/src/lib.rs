//! Client for a Firebase-style hierarchical JSON document store.
//!
//! The store exposes a REST CRUD surface and a persistent change stream
//! that pushes incremental mutations (`put` = subtree replace, `patch` =
//! subtree merge). This crate wires the two together:
//!
//! - [`Client`]: `get`/`set`/`push`/`update`/`delete` plus
//!   [`listen`](Client::listen) for the change stream
//! - [`StreamHooks`]/[`StreamObserver`]: callback-driven, cancellable
//!   consumption of a stream (from `flare-stream`)
//! - [`Patch`]/[`apply`]: canonical mutations applied to statically-typed
//!   object graphs (from `flare-patch`)
//!
//! # Quick Start
//!
//! ```no_run
//! use flare::{Client, Config, StreamHooks};
//!
//! # async fn run() -> Result<(), flare::ClientError> {
//! let client = Client::new(Config::new("https://example.firebaseio.com"))?;
//!
//! client.set("/todos/1", &"buy milk").await?;
//!
//! let observer = client
//!     .listen(
//!         "/todos",
//!         StreamHooks::new()
//!             .on_root_patch(|patch, first| println!("snapshot (first: {first}): {patch}"))
//!             .on_patch(|patch| println!("change: {patch}")),
//!     )
//!     .await?;
//! # observer.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod http;
mod response;
mod serializer;

pub use client::Client;
pub use config::Config;
pub use error::ClientError;
pub use response::{DbResponse, PushResult};
pub use serializer::{JsonSerializer, Serializer};

// Patch engine
pub use flare_patch::{
    apply, Classification, Container, ListIndex, NodeError, Patch, PatchError, PatchOp,
    PatchTarget,
};

// Change stream
pub use flare_stream::{
    MutationKind, MutationRecord, RecordDecoder, ShadowHooks, ShadowTree, StreamError,
    StreamHooks, StreamObserver, StreamState,
};
