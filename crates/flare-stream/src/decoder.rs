//! Change-stream protocol decoding.
//!
//! The wire format is a line protocol: an `event: <name>` line, for
//! `put`/`patch` a following `data: <json>` line, records separated by blank
//! lines. [`RecordDecoder`] is a pure two-state machine fed one line at a
//! time; all I/O lives in the observer.

use crate::error::StreamError;
use serde_json::Value;

const EVENT_PREFIX: &str = "event: ";
const DATA_PREFIX: &str = "data: ";
const KEEP_ALIVE: &str = "keep-alive";

/// Wire mutation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    /// Replace the subtree at the record's path.
    Put,
    /// Merge fields into the object at the record's path.
    Patch,
}

impl MutationKind {
    /// The wire event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Put => "put",
            MutationKind::Patch => "patch",
        }
    }
}

/// One decoded mutation event, before classification.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationRecord {
    /// Which event produced this record.
    pub event: MutationKind,
    /// Root-relative slash-delimited path, `/` for the root.
    pub path: String,
    /// Raw JSON payload text, rendered compactly.
    pub data: String,
}

#[derive(Clone, Copy, Debug)]
enum DecodeState {
    ExpectEvent,
    ExpectData(MutationKind),
}

/// Two-state line decoder for the change-stream protocol.
#[derive(Debug)]
pub struct RecordDecoder {
    state: DecodeState,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordDecoder {
    /// Create a decoder expecting the first event line.
    pub fn new() -> Self {
        Self {
            state: DecodeState::ExpectEvent,
        }
    }

    /// True when no record is half-read, i.e. end-of-stream is clean here.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecodeState::ExpectEvent)
    }

    /// Feed one line, without its terminator.
    ///
    /// Blank lines separate records and are skipped in any state. Returns a
    /// record whenever a `put`/`patch` frame completes. Framing violations
    /// are fatal; the decoder does not resynchronize.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<MutationRecord>, StreamError> {
        if line.is_empty() {
            return Ok(None);
        }
        match self.state {
            DecodeState::ExpectEvent => {
                let Some(event) = line.strip_prefix(EVENT_PREFIX) else {
                    return Err(StreamError::Framing {
                        expected: EVENT_PREFIX,
                        line: line.to_owned(),
                    });
                };
                match event {
                    // Connection padding only: no data line follows.
                    KEEP_ALIVE => Ok(None),
                    "put" => {
                        self.state = DecodeState::ExpectData(MutationKind::Put);
                        Ok(None)
                    }
                    "patch" => {
                        self.state = DecodeState::ExpectData(MutationKind::Patch);
                        Ok(None)
                    }
                    other => Err(StreamError::UnknownEvent {
                        event: other.to_owned(),
                    }),
                }
            }
            DecodeState::ExpectData(event) => {
                let Some(raw) = line.strip_prefix(DATA_PREFIX) else {
                    return Err(StreamError::Framing {
                        expected: DATA_PREFIX,
                        line: line.to_owned(),
                    });
                };
                let record = parse_payload(event, raw)?;
                self.state = DecodeState::ExpectEvent;
                Ok(Some(record))
            }
        }
    }
}

fn parse_payload(event: MutationKind, raw: &str) -> Result<MutationRecord, StreamError> {
    let payload_error = |reason: String| StreamError::Payload {
        event: event.as_str().to_owned(),
        reason,
        payload: raw.to_owned(),
    };

    let body: Value =
        serde_json::from_str(raw).map_err(|e| payload_error(format!("not valid JSON: {e}")))?;

    let path = match body.get("path") {
        None => return Err(payload_error("missing field 'path'".to_owned())),
        Some(Value::String(path)) => path.clone(),
        Some(_) => return Err(payload_error("field 'path' is not a string".to_owned())),
    };

    let data = body
        .get("data")
        .ok_or_else(|| payload_error("missing field 'data'".to_owned()))?;

    Ok(MutationRecord {
        event,
        path,
        data: data.to_string(),
    })
}
