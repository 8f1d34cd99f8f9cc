//! # Courier CloudEvents
//!
//! A CloudEvents v1.0 envelope model layered over Courier's message abstractions.
//!
//! - [`CloudEvent`]: the event entity, with lazily generated `id` and `time`
//! - [`ProtocolBinding`]: maps attribute names to transport header names
//! - [`validate_core`]: checks a pre-built [`SenderMessage`](courier_core::SenderMessage)
//!   at a transport boundary
//! - `to_http_request` (feature `http`): adapts an event to an HTTP request
//!
//! ## Example
//!
//! ```rust,ignore
//! use courier_cloudevents::CloudEvent;
//! use url::Url;
//!
//! let event = CloudEvent::new()
//!     .with_source(Url::parse("https://example.com")?)
//!     .with_type("order.created");
//!
//! let message = event.to_sender_message(None)?;
//! sender.send(message).await?;
//! ```

pub mod binding;
pub mod content_type;
pub mod error;
pub mod event;
#[cfg(feature = "http")]
pub mod request;
pub mod validation;

pub use binding::{
    BindingKind, IdentityBinding, PrefixedBinding, ProtocolBinding, default_binding,
    set_default_binding,
};
pub use content_type::ContentType;
pub use error::{CloudEventError, CloudEventResult};
pub use event::{CloudEvent, Data, ReceiverMessageExt, SPEC_VERSION, attributes};
#[cfg(feature = "http")]
pub use request::{HttpContent, HttpRequestMessage, is_content_header};
pub use validation::{validate_core, with_cloud_event_validation};
