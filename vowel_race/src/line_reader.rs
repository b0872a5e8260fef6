use std::io;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tracing::debug;

use crate::line_source::LineSource;

#[derive(Debug, Clone, Error)]
pub enum LineError {
    #[error("line reader has been closed")]
    Closed,
    #[error("timed out waiting for a line")]
    TimedOut,
    #[error("error while reading input: {0}")]
    Source(Arc<io::Error>),
}

type LineResult = Result<String, LineError>;

struct Pending {
    waiters: Vec<oneshot::Sender<LineResult>>,
    reading: bool,
    closed: bool,
}

struct Shared {
    pending: Mutex<Pending>,
    source: tokio::sync::Mutex<Option<LineSource>>,
    closed: watch::Sender<bool>,
}

impl Shared {
    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands `result` to every waiter registered so far and goes idle.
    fn fulfill(&self, result: LineResult) {
        let waiters = {
            let mut pending = self.lock_pending();
            pending.reading = false;
            mem::take(&mut pending.waiters)
        };
        debug!(waiters = waiters.len(), ok = result.is_ok(), "read cycle finished");
        for waiter in waiters {
            // a dropped handle no longer cares about the line
            let _ = waiter.send(result.clone());
        }
    }
}

/// Non-blocking line input shared by any number of callers.
///
/// Every [`LineReader::request_line`] made before a line arrives gets that
/// same line; only one line is consumed from the source per delivery. The
/// actual read runs as a background task that is started on demand and goes
/// idle again once it has delivered. Blank lines are skipped.
#[derive(Clone)]
pub struct LineReader {
    shared: Arc<Shared>,
}

impl LineReader {
    pub fn new(source: LineSource) -> LineReader {
        let (closed, _) = watch::channel(false);
        LineReader {
            shared: Arc::new(Shared {
                pending: Mutex::new(Pending { waiters: Vec::new(), reading: false, closed: false }),
                source: tokio::sync::Mutex::new(Some(source)),
                closed,
            }),
        }
    }

    pub fn stdin() -> LineReader {
        LineReader::new(LineSource::stdin())
    }

    /// Registers interest in the next line and returns immediately.
    ///
    /// # Panics
    /// When it has to start a read and is called outside a tokio runtime.
    pub fn request_line(&self) -> Result<LineHandle, LineError> {
        let (sender, receiver) = oneshot::channel();
        let mut pending = self.shared.lock_pending();
        if pending.closed {
            return Err(LineError::Closed);
        }
        pending.waiters.push(sender);
        if !pending.reading {
            pending.reading = true;
            debug!("starting read cycle");
            tokio::spawn(read_cycle(self.shared.clone()));
        }
        Ok(LineHandle { state: HandleState::Pending(receiver) })
    }

    /// Stops accepting requests and releases the source. Handles still
    /// waiting resolve with [`LineError::Closed`]. Calling it again does nothing.
    pub fn close(&self) {
        let waiters = {
            let mut pending = self.shared.lock_pending();
            if pending.closed {
                return;
            }
            pending.closed = true;
            mem::take(&mut pending.waiters)
        };
        self.shared.closed.send_replace(true);
        for waiter in waiters {
            let _ = waiter.send(Err(LineError::Closed));
        }
        // a running read cycle holds the source and drops it when it sees the close
        if let Ok(mut source) = self.shared.source.try_lock() {
            source.take();
        }
        debug!("line reader closed");
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock_pending().closed
    }
}

async fn read_cycle(shared: Arc<Shared>) {
    let mut closed = shared.closed.subscribe();
    let mut source = shared.source.lock().await;

    let result = loop {
        let Some(lines) = source.as_mut() else {
            break Err(LineError::Closed);
        };
        tokio::select! {
            biased;
            _ = wait_closed(&mut closed) => break Err(LineError::Closed),
            line = lines.next_line() => match line {
                Ok(line) if line.trim().is_empty() => {
                    debug!("skipping blank line");
                    continue;
                }
                Ok(line) => break Ok(line),
                Err(e) => break Err(LineError::Source(Arc::new(e))),
            },
        }
    };

    if *closed.borrow() {
        source.take();
    }
    drop(source);
    shared.fulfill(result);
}

async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    while !*closed.borrow_and_update() {
        if closed.changed().await.is_err() {
            return;
        }
    }
}

enum HandleState {
    Pending(oneshot::Receiver<LineResult>),
    Resolved(LineResult),
}

/// A pending request for the next line.
pub struct LineHandle {
    state: HandleState,
}

impl LineHandle {
    /// Waits until the line arrives. Dropping the future leaves the request
    /// registered, so waiting again picks up where it left off.
    pub async fn wait(&mut self) -> Result<String, LineError> {
        let result = match &mut self.state {
            HandleState::Resolved(result) => return result.clone(),
            HandleState::Pending(receiver) => receiver.await.unwrap_or(Err(LineError::Closed)),
        };
        self.state = HandleState::Resolved(result.clone());
        result
    }

    /// Like [`LineHandle::wait`] but gives up after `timeout` with
    /// [`LineError::TimedOut`]. The read itself keeps going.
    pub async fn await_with_timeout(&mut self, timeout: Duration) -> Result<String, LineError> {
        match tokio::time::timeout(timeout, self.wait()).await {
            Ok(result) => result,
            Err(_) => Err(LineError::TimedOut),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, HandleState::Resolved(_))
    }
}
