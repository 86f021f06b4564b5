//! Error types for change-stream decoding and observation.

use thiserror::Error;

/// Failures that terminate a change stream.
///
/// Decode and framing failures are fatal: the protocol has no
/// resynchronization point, so the observer stops rather than guessing at
/// the rest of a corrupt stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A line arrived without the prefix the state machine expected.
    #[error("malformed frame: expected a line starting with '{expected}', got: {line}")]
    Framing {
        /// The prefix that was required at this point of the protocol.
        expected: &'static str,
        /// The offending raw line.
        line: String,
    },

    /// An event name outside the protocol vocabulary.
    #[error("unrecognized stream event '{event}'")]
    UnknownEvent {
        /// The event name as received.
        event: String,
    },

    /// A `put`/`patch` payload missing or mistyping a required field.
    #[error("invalid '{event}' payload ({reason}): {payload}")]
    Payload {
        /// The event the payload belonged to.
        event: String,
        /// Why the payload was rejected.
        reason: String,
        /// The raw payload text, for diagnosis.
        payload: String,
    },

    /// The stream ended while a record was half-read.
    #[error("stream ended in the middle of a record")]
    Truncated,

    /// A non-root change arrived before the initial root snapshot.
    #[error("stream emitted a change before the initial root snapshot")]
    NoInitialSnapshot,

    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}
