//! # Courier Pipe
//!
//! Best-effort delivery of Courier messages over a named local channel: a Unix domain
//! socket on Unix, a named pipe on Windows.
//!
//! Every [`PipeSender`] owns one background worker that writes queued frames in FIFO
//! order, one connection per frame. Frames that find no listener are dropped; the caller
//! never blocks on delivery and never sees delivery errors.
//!
//! ## Wire format
//!
//! Each connection carries exactly one newline-terminated JSON record:
//!
//! ```text
//! {"stringValue":"...","messageFormat":"Text","priority":5,"headers":{"type":"..."}}
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use courier_pipe::{PipeSender, PipeSenderConfig};
//!
//! let sender = PipeSender::new(PipeSenderConfig::new("orders"))?;
//! sender.enqueue(&SenderMessage::new("hello"))?;
//! sender.shutdown().await;
//! ```

mod channel;
pub mod compression;
pub mod config;
pub mod error;
pub mod message;
pub mod receiver;
pub mod sender;
pub mod serializer;

pub use channel::channel_path;
pub use config::PipeSenderConfig;
pub use error::{SerializerError, SerializerResult};
pub use message::PipeMessage;
pub use receiver::{PipeReceiver, decode_record};
pub use sender::{DropHook, DropReason, DroppedFrame, PipeSender, PipeSenderHandle, SenderStats};
