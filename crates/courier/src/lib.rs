//! # Courier
//!
//! CloudEvents v1.0 envelopes over pluggable message transports.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  to_sender_message  ┌───────────────┐  enqueue  ┌────────────┐
//! │ CloudEvent │────────────────────▶│ SenderMessage │──────────▶│ PipeSender │──▶ named channel
//! └────────────┘   (ProtocolBinding) └───────────────┘           └────────────┘
//! ```
//!
//! - **Core**: message, header and sender abstractions shared by every transport
//! - **CloudEvents**: the event entity, protocol bindings, `validate_core` and HTTP adaptation
//! - **Pipe**: best-effort named-channel transport with a single FIFO worker per sender
//! - **Runtime**: configuration loading, logging setup and configured sender startup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sender = with_cloud_event_validation(
//!         PipeSender::new(PipeSenderConfig::new("orders"))?.handle(),
//!         None,
//!     );
//!
//!     let event = CloudEvent::new()
//!         .with_source(Url::parse("urn:orders")?)
//!         .with_type("order.created");
//!     sender.send(event.to_sender_message(None)?).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `http`: HTTP request adaptation for cloud events (default)
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use courier_cloudevents as cloudevents;
pub use courier_core as core;
pub use courier_pipe as pipe;
pub use courier_runtime as runtime;

/// Commonly used types.
pub mod prelude {
    pub use courier_core::{
        CoreError, CoreResult, HeaderValue, Headers, MessageFormat, Payload, ReceiverMessage,
        Sender, SenderMessage,
    };

    pub use courier_cloudevents::{
        BindingKind, CloudEvent, CloudEventError, Data, ProtocolBinding, ReceiverMessageExt,
        validate_core, with_cloud_event_validation,
    };

    pub use courier_pipe::{PipeReceiver, PipeSender, PipeSenderConfig, PipeSenderHandle};

    pub use courier_runtime::{CourierConfig, CourierRuntime};

    pub use url::Url;
}
