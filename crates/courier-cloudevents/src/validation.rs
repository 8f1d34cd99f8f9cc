//! Validation of pre-built envelopes at a transport boundary.

use std::sync::Arc;

use chrono::Utc;
use courier_core::{Sender, SenderMessage, ValidatingSender, ValidationError};

use crate::binding::{ProtocolBinding, resolve};
use crate::event::{SPEC_VERSION, attributes, new_id};

/// Ensures an outbound message carries the required cloud event headers.
///
/// `specversion` must be `"1.0"`, `source` must be a URI and `type` must be present.
/// A missing `id` or `time` is filled in rather than rejected; a `time` header that does
/// not parse as a timestamp is replaced.
pub fn validate_core(
    message: &mut SenderMessage,
    binding: Option<&dyn ProtocolBinding>,
) -> Result<(), ValidationError> {
    let binding = resolve(binding);
    let headers = &mut message.headers;

    let header = binding.header_name(attributes::SPEC_VERSION);
    match headers.get_str(&header) {
        None => {
            return Err(ValidationError::new(format!(
                "The '{header}' header is missing from the SenderMessage."
            )));
        }
        Some(v) if v != SPEC_VERSION => {
            return Err(ValidationError::new(format!(
                "The '{header}' header must have a value of '{SPEC_VERSION}'."
            )));
        }
        Some(_) => {}
    }

    let header = binding.header_name(attributes::ID);
    if !headers.contains(&header) {
        headers.insert(header, new_id());
    }

    let header = binding.header_name(attributes::SOURCE);
    if headers.get_uri(&header).is_none() {
        return Err(ValidationError::new(format!(
            "The '{header}' header is missing from the SenderMessage."
        )));
    }

    let header = binding.header_name(attributes::TYPE);
    if !headers.contains(&header) {
        return Err(ValidationError::new(format!(
            "The '{header}' header is missing from the SenderMessage."
        )));
    }

    let header = binding.header_name(attributes::TIME);
    if headers.get_timestamp(&header).is_none() {
        headers.insert(header, Utc::now());
    }

    Ok(())
}

/// Wraps a sender so every message is checked with [`validate_core`] before sending.
///
/// With `binding` unset, the process default binding is resolved on each send.
pub fn with_cloud_event_validation<S: Sender>(
    sender: S,
    binding: Option<Arc<dyn ProtocolBinding>>,
) -> ValidatingSender<S> {
    ValidatingSender::new(sender, move |message| {
        validate_core(message, binding.as_deref())
    })
}
