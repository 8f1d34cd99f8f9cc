//! The named-channel sender.
//!
//! Producers build and serialize frames on their own thread and push the record onto an
//! unbounded queue. A single worker task drains the queue in order, opening one fresh
//! connection per frame:
//!
//! ```text
//! producers ──enqueue──▶ [ FIFO queue ] ──▶ worker ──connect/write/close──▶ channel
//! ```
//!
//! Delivery is best-effort and at-most-once. A frame with no listener on the other end,
//! or one that hits an I/O error, is dropped and reported only through [`SenderStats`]
//! and the optional drop hook.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use courier_core::{CoreResult, Sender, SenderMessage, TransportError, TransportResult, names};
use futures::SinkExt;
use indexmap::IndexMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedWrite, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::channel::{self, ClientStream};
use crate::compression;
use crate::config::PipeSenderConfig;
use crate::message::PipeMessage;
use crate::serializer;

// =============================================================================
// Drop Reporting
// =============================================================================

/// Why a frame was not delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// No listener was present on the channel.
    NoListener,
    /// Connecting or writing failed.
    Io(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoListener => f.write_str("no listener"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

/// A frame the worker gave up on.
#[derive(Debug, Clone)]
pub struct DroppedFrame {
    /// Channel the frame was addressed to.
    pub pipe_name: String,
    /// Why it was dropped.
    pub reason: DropReason,
}

/// Callback invoked by the worker for every dropped frame.
pub type DropHook = Arc<dyn Fn(&DroppedFrame) + Send + Sync>;

/// Delivery counters for one sender.
#[derive(Debug, Default)]
pub struct SenderStats {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl SenderStats {
    /// Frames accepted onto the queue.
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Frames written to a listener.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Frames dropped by the worker.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Handle
// =============================================================================

struct Shared {
    name: String,
    pipe_name: String,
    compressed: bool,
    originating_system: String,
    stats: Arc<SenderStats>,
}

impl Shared {
    /// Builds the wire frame for a message.
    fn frame(&self, message: &SenderMessage) -> TransportResult<PipeMessage> {
        let should_compress = message.should_compress(self.compressed);
        let string_value = if should_compress {
            compression::compress(&message.string_value())?
        } else {
            message.string_value().into_owned()
        };

        let mut headers = IndexMap::with_capacity(message.headers.len() + 3);
        let mut has_origin = false;
        for (name, value) in &message.headers {
            if name == names::ORIGINATING_SYSTEM {
                has_origin = true;
            }
            headers.insert(name.clone(), value.to_wire_string().into_owned());
        }

        headers.insert(
            names::MESSAGE_FORMAT.to_string(),
            message.message_format().to_string(),
        );
        if !has_origin {
            headers.insert(
                names::ORIGINATING_SYSTEM.to_string(),
                self.originating_system.clone(),
            );
        }
        if should_compress {
            headers.insert(names::COMPRESSED_PAYLOAD.to_string(), "true".to_string());
        }

        Ok(PipeMessage {
            string_value,
            message_format: message.message_format(),
            priority: message.priority,
            headers,
        })
    }
}

/// Cloneable enqueue-only handle to a [`PipeSender`].
#[derive(Clone)]
pub struct PipeSenderHandle {
    tx: mpsc::UnboundedSender<String>,
    shared: Arc<Shared>,
}

impl PipeSenderHandle {
    /// Serializes a message and queues it for delivery.
    ///
    /// Returns as soon as the record is queued. Fails only if the message cannot be
    /// encoded or the sender has shut down; delivery problems are never reported here.
    pub fn enqueue(&self, message: &SenderMessage) -> TransportResult<()> {
        let frame = self.shared.frame(message)?;
        let record = serializer::serialize(&frame)?;

        self.tx.send(record).map_err(|_| TransportError::Closed {
            name: self.shared.name.clone(),
        })?;
        self.shared.stats.enqueued.fetch_add(1, Ordering::Relaxed);

        trace!(sender = %self.shared.name, pipe = %self.shared.pipe_name, "Frame enqueued");
        Ok(())
    }

    /// Returns the channel name.
    pub fn pipe_name(&self) -> &str {
        &self.shared.pipe_name
    }

    /// Returns the delivery counters.
    pub fn stats(&self) -> Arc<SenderStats> {
        self.shared.stats.clone()
    }
}

#[async_trait]
impl Sender for PipeSenderHandle {
    fn name(&self) -> &str {
        &self.shared.name
    }

    async fn send(&self, message: SenderMessage) -> CoreResult<()> {
        self.enqueue(&message)?;
        Ok(())
    }
}

// =============================================================================
// Worker
// =============================================================================

struct Worker {
    rx: mpsc::UnboundedReceiver<String>,
    shutdown: CancellationToken,
    pipe_name: String,
    path: PathBuf,
    connect_timeout: Duration,
    stats: Arc<SenderStats>,
    on_drop: Option<DropHook>,
}

impl Worker {
    async fn run(mut self) {
        debug!(pipe = %self.pipe_name, path = %self.path.display(), "Pipe sender worker started");

        loop {
            tokio::select! {
                biased;

                record = self.rx.recv() => match record {
                    Some(record) => self.deliver(&record).await,
                    None => break,
                },

                _ = self.shutdown.cancelled() => {
                    self.rx.close();
                    while let Some(record) = self.rx.recv().await {
                        self.deliver(&record).await;
                    }
                    break;
                }
            }
        }

        debug!(
            pipe = %self.pipe_name,
            delivered = self.stats.delivered(),
            dropped = self.stats.dropped(),
            "Pipe sender worker stopped"
        );
    }

    async fn deliver(&self, record: &str) {
        match self.write_record(record).await {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                trace!(pipe = %self.pipe_name, len = record.len(), "Frame delivered");
            }
            Err(reason) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(pipe = %self.pipe_name, reason = %reason, "Frame dropped");
                if let Some(hook) = &self.on_drop {
                    hook(&DroppedFrame {
                        pipe_name: self.pipe_name.clone(),
                        reason,
                    });
                }
            }
        }
    }

    async fn write_record(&self, record: &str) -> Result<(), DropReason> {
        let stream = self.connect().await?;
        let mut sink = FramedWrite::new(stream, LinesCodec::new());
        sink.send(record)
            .await
            .map_err(|e| DropReason::Io(e.to_string()))?;
        SinkExt::<&str>::close(&mut sink)
            .await
            .map_err(|e| DropReason::Io(e.to_string()))
    }

    async fn connect(&self) -> Result<ClientStream, DropReason> {
        let result = if self.connect_timeout.is_zero() {
            channel::connect(&self.path).await
        } else {
            match tokio::time::timeout(self.connect_timeout, channel::connect(&self.path)).await {
                Ok(result) => result,
                Err(_) => return Err(DropReason::NoListener),
            }
        };

        result.map_err(|e| {
            if channel::is_no_listener(&e) {
                DropReason::NoListener
            } else {
                DropReason::Io(e.to_string())
            }
        })
    }
}

// =============================================================================
// Sender
// =============================================================================

/// A [`Sender`] that delivers messages over a named channel.
///
/// Each instance owns exactly one worker task. Call [`shutdown`](Self::shutdown) to wait
/// for queued frames to be attempted; dropping the sender closes the queue and lets the
/// worker drain in the background.
pub struct PipeSender {
    handle: PipeSenderHandle,
    shutdown: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl PipeSender {
    /// Creates a sender and spawns its worker on the current tokio runtime.
    pub fn new(config: PipeSenderConfig) -> TransportResult<Self> {
        Self::spawn(config, None)
    }

    /// Creates a sender that reports every dropped frame to `on_drop`.
    pub fn with_drop_hook<F>(config: PipeSenderConfig, on_drop: F) -> TransportResult<Self>
    where
        F: Fn(&DroppedFrame) + Send + Sync + 'static,
    {
        Self::spawn(config, Some(Arc::new(on_drop)))
    }

    fn spawn(config: PipeSenderConfig, on_drop: Option<DropHook>) -> TransportResult<Self> {
        if config.name.is_empty() {
            return Err(TransportError::InvalidConfig(
                "sender name cannot be empty".into(),
            ));
        }
        if config.pipe_name().is_empty() {
            return Err(TransportError::InvalidConfig(
                "pipe name cannot be empty".into(),
            ));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::NoRuntime(e.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let stats = Arc::new(SenderStats::default());
        let pipe_name = config.pipe_name().to_string();

        let worker = Worker {
            rx,
            shutdown: shutdown.clone(),
            path: channel::channel_path(&pipe_name),
            pipe_name: pipe_name.clone(),
            connect_timeout: config.connect_timeout(),
            stats: stats.clone(),
            on_drop,
        };
        let worker = runtime.spawn(worker.run());

        info!(sender = %config.name, pipe = %pipe_name, compressed = config.compressed, "Pipe sender started");

        let shared = Arc::new(Shared {
            name: config.name,
            pipe_name,
            compressed: config.compressed,
            originating_system: config.originating_system,
            stats,
        });

        Ok(Self {
            handle: PipeSenderHandle { tx, shared },
            shutdown,
            worker: Some(worker),
        })
    }

    /// Runs `f` with a handle to a fresh sender, then shuts the sender down.
    ///
    /// The drain happens whatever `f` returns, so errors produced inside `f` still leave
    /// every queued frame attempted.
    pub async fn scoped<F, Fut, T>(config: PipeSenderConfig, f: F) -> TransportResult<T>
    where
        F: FnOnce(PipeSenderHandle) -> Fut,
        Fut: Future<Output = T>,
    {
        let sender = Self::new(config)?;
        let output = f(sender.handle()).await;
        sender.shutdown().await;
        Ok(output)
    }

    /// Returns a cloneable handle for additional producers.
    pub fn handle(&self) -> PipeSenderHandle {
        self.handle.clone()
    }

    /// Queues a message. See [`PipeSenderHandle::enqueue`].
    pub fn enqueue(&self, message: &SenderMessage) -> TransportResult<()> {
        self.handle.enqueue(message)
    }

    /// Returns the channel name.
    pub fn pipe_name(&self) -> &str {
        self.handle.pipe_name()
    }

    /// Returns the delivery counters.
    pub fn stats(&self) -> Arc<SenderStats> {
        self.handle.stats()
    }

    /// Stops accepting messages and waits until every queued frame has been attempted.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!(sender = %self.handle.shared.name, error = %e, "Pipe sender worker failed");
            }
        }
        info!(sender = %self.handle.shared.name, "Pipe sender stopped");
    }
}

impl Drop for PipeSender {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl Sender for PipeSender {
    fn name(&self) -> &str {
        self.handle.name()
    }

    async fn send(&self, message: SenderMessage) -> CoreResult<()> {
        self.handle.send(message).await
    }
}
