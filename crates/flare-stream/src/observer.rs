//! Cancellable background consumption of a change stream.

use crate::decoder::{MutationKind, MutationRecord, RecordDecoder};
use crate::error::StreamError;
use flare_patch::Patch;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Raw-line diagnostic callback.
pub type LineHook = Box<dyn Fn(&str) + Send + Sync>;
/// Raw (event name, data line) diagnostic callback.
pub type RawEventHook = Box<dyn Fn(&str, &str) + Send + Sync>;
/// Decoded mutation record callback.
pub type RecordHook = Box<dyn Fn(&MutationRecord) + Send + Sync>;
/// Synthesized patch callback.
pub type PatchHook = Box<dyn Fn(&Patch) + Send + Sync>;
/// Root snapshot callback; the flag is true exactly once, for the first one.
pub type RootPatchHook = Box<dyn Fn(&Patch, bool) + Send + Sync>;
/// Terminating error callback.
pub type ErrorHook = Box<dyn Fn(&StreamError) + Send + Sync>;

/// Callback registrations for one stream, fixed at construction.
///
/// Each registration point is a list; all registered callbacks run on the
/// stream's own task, in registration order.
#[derive(Default)]
pub struct StreamHooks {
    on_line: Vec<LineHook>,
    on_raw_event: Vec<RawEventHook>,
    on_record: Vec<RecordHook>,
    on_root_patch: Vec<RootPatchHook>,
    on_patch: Vec<PatchHook>,
    on_error: Vec<ErrorHook>,
}

impl StreamHooks {
    /// Create an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe every non-blank raw line (diagnostics only).
    pub fn on_line(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_line.push(Box::new(hook));
        self
    }

    /// Observe every decoded (event name, data line) pair (diagnostics only).
    pub fn on_raw_event(mut self, hook: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.on_raw_event.push(Box::new(hook));
        self
    }

    /// Observe every decoded mutation record.
    pub fn on_record(mut self, hook: impl Fn(&MutationRecord) + Send + Sync + 'static) -> Self {
        self.on_record.push(Box::new(hook));
        self
    }

    /// Observe patches synthesized from `put` events at the root path. The
    /// flag is true exactly once, when the first root snapshot arrives.
    pub fn on_root_patch(mut self, hook: impl Fn(&Patch, bool) + Send + Sync + 'static) -> Self {
        self.on_root_patch.push(Box::new(hook));
        self
    }

    /// Observe every other synthesized patch, in arrival order.
    pub fn on_patch(mut self, hook: impl Fn(&Patch) + Send + Sync + 'static) -> Self {
        self.on_patch.push(Box::new(hook));
        self
    }

    /// Receive the terminating error. Without an error hook a failure is
    /// still visible through [`StreamObserver::state`].
    pub fn on_error(mut self, hook: impl Fn(&StreamError) + Send + Sync + 'static) -> Self {
        self.on_error.push(Box::new(hook));
        self
    }
}

/// Observable lifecycle of a stream.
#[derive(Clone, Debug)]
pub enum StreamState {
    /// The background task is consuming the stream.
    Open,
    /// The stream ended or was cancelled cleanly.
    Closed,
    /// The stream terminated with a fatal error.
    Failed(Arc<StreamError>),
}

/// Owns the background task consuming one change stream.
///
/// Patches are delivered strictly in arrival order on a single task, which
/// matters: later patches may depend on containers created by earlier ones.
/// Dropping the observer cancels the task at its next read; the task owns
/// the reader, so the underlying connection is released when it exits.
pub struct StreamObserver {
    token: CancellationToken,
    state: Arc<Mutex<StreamState>>,
    handle: Option<JoinHandle<()>>,
}

impl StreamObserver {
    /// Spawn the read loop over a buffered line source.
    pub fn spawn<R>(reader: R, hooks: StreamHooks) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let token = CancellationToken::new();
        let state = Arc::new(Mutex::new(StreamState::Open));
        let handle = tokio::spawn(run(reader, hooks, token.clone(), Arc::clone(&state)));
        Self {
            token,
            state,
            handle: Some(handle),
        }
    }

    /// Request cancellation; the loop stops at its next read, never in the
    /// middle of applying a record.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state.lock().expect("stream state lock").clone()
    }

    /// Wait for the stream to end on its own.
    pub async fn join(mut self) -> StreamState {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        self.state()
    }

    /// Cancel and wait for the background task to finish.
    pub async fn shutdown(self) -> StreamState {
        self.token.cancel();
        self.join().await
    }
}

impl Drop for StreamObserver {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run<R>(
    mut reader: R,
    hooks: StreamHooks,
    token: CancellationToken,
    state: Arc<Mutex<StreamState>>,
) where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    match read_loop(&mut reader, &hooks, &token).await {
        Ok(()) => {
            tracing::debug!("change stream closed");
            *state.lock().expect("stream state lock") = StreamState::Closed;
        }
        Err(err) => {
            tracing::error!(error = %err, "change stream terminated");
            for hook in &hooks.on_error {
                hook(&err);
            }
            *state.lock().expect("stream state lock") = StreamState::Failed(Arc::new(err));
        }
    }
    // The reader, and with it the underlying connection, drops here.
}

async fn read_loop<R>(
    reader: &mut R,
    hooks: &StreamHooks,
    token: &CancellationToken,
) -> Result<(), StreamError>
where
    R: AsyncBufRead + Unpin,
{
    let mut decoder = RecordDecoder::new();
    let mut snapshots: u64 = 0;
    let mut line = String::new();

    loop {
        line.clear();
        let read = tokio::select! {
            // Cancellation wins over a ready read: the loop must stop at
            // the next checkpoint even on a busy stream.
            biased;
            _ = token.cancelled() => return Ok(()),
            read = reader.read_line(&mut line) => read?,
        };
        if read == 0 {
            return if decoder.is_idle() {
                Ok(())
            } else {
                Err(StreamError::Truncated)
            };
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            continue;
        }
        for hook in &hooks.on_line {
            hook(line);
        }

        let Some(record) = decoder.feed_line(line)? else {
            continue;
        };
        tracing::debug!(event = record.event.as_str(), path = %record.path, "decoded mutation");
        for hook in &hooks.on_raw_event {
            hook(record.event.as_str(), line);
        }
        for hook in &hooks.on_record {
            hook(&record);
        }

        let patch = record.to_patch();
        if record.event == MutationKind::Put && record.path == "/" {
            let first = snapshots == 0;
            snapshots += 1;
            for hook in &hooks.on_root_patch {
                hook(&patch, first);
            }
        } else {
            // Consumers mirroring an object cannot apply incremental
            // changes before the object itself was materialized.
            if snapshots == 0 && !hooks.on_patch.is_empty() {
                return Err(StreamError::NoInitialSnapshot);
            }
            for hook in &hooks.on_patch {
                hook(&patch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_patch::PatchOp;
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, BufReader};

    fn collected<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, Arc<Mutex<Vec<T>>>) {
        let store = Arc::new(Mutex::new(Vec::new()));
        (Arc::clone(&store), store)
    }

    #[tokio::test]
    async fn delivers_patches_in_arrival_order() {
        let (writer_side, reader_side) = tokio::io::duplex(1024);
        let (sink, patches) = collected::<(PatchOp, String)>();
        let (root_sink, roots) = collected::<bool>();

        let hooks = StreamHooks::new()
            .on_root_patch(move |_, first| root_sink.lock().unwrap().push(first))
            .on_patch(move |patch| {
                sink.lock()
                    .unwrap()
                    .push((patch.op(), patch.path().to_owned()))
            });
        let observer = StreamObserver::spawn(BufReader::new(reader_side), hooks);

        let mut writer = writer_side;
        writer
            .write_all(
                b"event: put\ndata: {\"path\":\"/\",\"data\":{}}\n\n\
                  event: keep-alive\n\n\
                  event: put\ndata: {\"path\":\"/items/-\",\"data\":\"a\"}\n\n\
                  event: patch\ndata: {\"path\":\"/user\",\"data\":{\"name\":\"ada\"}}\n\n\
                  event: put\ndata: {\"path\":\"/\",\"data\":{}}\n",
            )
            .await
            .unwrap();
        drop(writer);

        let state = observer.join().await;
        assert!(matches!(state, StreamState::Closed));

        assert_eq!(*roots.lock().unwrap(), vec![true, false]);
        assert_eq!(
            *patches.lock().unwrap(),
            vec![
                (PatchOp::Add, "/items/-".to_owned()),
                (PatchOp::Add, "/user".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn framing_error_fails_the_stream_and_reaches_error_hooks() {
        let (writer_side, reader_side) = tokio::io::duplex(1024);
        let (sink, seen) = collected::<String>();

        let hooks = StreamHooks::new().on_error(move |err| {
            sink.lock().unwrap().push(err.to_string());
        });
        let observer = StreamObserver::spawn(BufReader::new(reader_side), hooks);

        let mut writer = writer_side;
        writer.write_all(b"foo: bar\n").await.unwrap();
        drop(writer);

        let state = observer.join().await;
        assert!(matches!(state, StreamState::Failed(_)));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("event: "));
    }

    #[tokio::test]
    async fn failure_is_visible_without_an_error_hook() {
        let (writer_side, reader_side) = tokio::io::duplex(1024);
        let observer = StreamObserver::spawn(BufReader::new(reader_side), StreamHooks::new());

        let mut writer = writer_side;
        writer.write_all(b"event: put\n").await.unwrap();
        drop(writer);

        let state = observer.join().await;
        match state {
            StreamState::Failed(err) => assert!(matches!(*err, StreamError::Truncated)),
            other => panic!("expected failed state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn change_before_first_snapshot_fails_mirroring_consumers() {
        let (writer_side, reader_side) = tokio::io::duplex(1024);
        let hooks = StreamHooks::new().on_patch(|_| {});
        let observer = StreamObserver::spawn(BufReader::new(reader_side), hooks);

        let mut writer = writer_side;
        writer
            .write_all(b"event: put\ndata: {\"path\":\"/a\",\"data\":1}\n")
            .await
            .unwrap();
        drop(writer);

        match observer.join().await {
            StreamState::Failed(err) => {
                assert!(matches!(*err, StreamError::NoInitialSnapshot))
            }
            other => panic!("expected failed state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_closes_an_idle_stream() {
        let (_writer_side, reader_side) = tokio::io::duplex(1024);
        let observer = StreamObserver::spawn(BufReader::new(reader_side), StreamHooks::new());

        // Give the loop a chance to park on the read before cancelling.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let state = observer.shutdown().await;
        assert!(matches!(state, StreamState::Closed));
    }

    #[tokio::test]
    async fn raw_hooks_observe_lines_and_event_pairs() {
        let (writer_side, reader_side) = tokio::io::duplex(1024);
        let (line_sink, lines) = collected::<String>();
        let (raw_sink, raws) = collected::<(String, String)>();

        let hooks = StreamHooks::new()
            .on_line(move |line| line_sink.lock().unwrap().push(line.to_owned()))
            .on_raw_event(move |event, data| {
                raw_sink
                    .lock()
                    .unwrap()
                    .push((event.to_owned(), data.to_owned()))
            });
        let observer = StreamObserver::spawn(BufReader::new(reader_side), hooks);

        let mut writer = writer_side;
        writer
            .write_all(b"event: put\ndata: {\"path\":\"/\",\"data\":null}\n\n")
            .await
            .unwrap();
        drop(writer);
        observer.join().await;

        assert_eq!(
            *lines.lock().unwrap(),
            vec![
                "event: put".to_owned(),
                "data: {\"path\":\"/\",\"data\":null}".to_owned(),
            ]
        );
        assert_eq!(
            *raws.lock().unwrap(),
            vec![(
                "put".to_owned(),
                "data: {\"path\":\"/\",\"data\":null}".to_owned()
            )]
        );
    }
}
