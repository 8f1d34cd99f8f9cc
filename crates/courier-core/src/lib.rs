//! # Courier Core
//!
//! Envelope abstractions shared by every Courier crate.
//!
//! - **Messages**: [`SenderMessage`] (outbound) and [`ReceiverMessage`] (inbound), each a
//!   [`Payload`] plus ordered, typed [`Headers`]
//! - **Senders**: the [`Sender`] trait and the [`ValidatingSender`] decorator, which runs a
//!   send-time validation hook before forwarding
//! - **Errors**: [`ValidationError`], [`ArgumentError`] and [`TransportError`], aggregated
//!   into [`CoreError`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use courier_core::{SenderMessage, Sender};
//!
//! let message = SenderMessage::new("hello")
//!     .with_header("type", "greeting")
//!     .with_priority(5);
//!
//! sender.send(message).await?;
//! ```

pub mod error;
pub mod header;
pub mod message;
pub mod sender;

pub use error::{
    ArgumentError, CoreError, CoreResult, TransportError, TransportResult, ValidationError,
};
pub use header::{HeaderValue, Headers, format_timestamp, names};
pub use message::{MessageFormat, Payload, ReceiverMessage, SenderMessage};
pub use sender::{BoxedSender, Sender, ValidatingSender, ValidationHook};
