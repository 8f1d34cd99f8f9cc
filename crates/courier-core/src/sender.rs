//! Sender abstraction and the validating decorator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CoreResult, ValidationError};
use crate::message::SenderMessage;

/// A transport endpoint that accepts outbound messages.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Name of this sender instance.
    fn name(&self) -> &str;

    /// Sends a message.
    ///
    /// Implementations may deliver asynchronously; a successful return only means the
    /// message was accepted.
    async fn send(&self, message: SenderMessage) -> CoreResult<()>;
}

/// Boxed sender.
pub type BoxedSender = Arc<dyn Sender>;

/// Hook run against every message before it is forwarded.
///
/// The hook may fill in missing headers; returning an error rejects the message.
pub type ValidationHook =
    Arc<dyn Fn(&mut SenderMessage) -> Result<(), ValidationError> + Send + Sync>;

/// A sender that validates messages before handing them to an inner sender.
pub struct ValidatingSender<S> {
    inner: S,
    validate: ValidationHook,
}

impl<S: Sender> ValidatingSender<S> {
    /// Wraps `inner` with a validation hook.
    pub fn new<F>(inner: S, validate: F) -> Self
    where
        F: Fn(&mut SenderMessage) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self {
            inner,
            validate: Arc::new(validate),
        }
    }

    /// Returns the wrapped sender.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps the decorator.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: Sender> Sender for ValidatingSender<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn send(&self, mut message: SenderMessage) -> CoreResult<()> {
        if let Err(e) = (self.validate)(&mut message) {
            debug!(sender = %self.inner.name(), error = %e, "Message rejected by validation");
            return Err(e.into());
        }
        self.inner.send(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<SenderMessage>>,
    }

    #[async_trait]
    impl Sender for RecordingSender {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, message: SenderMessage) -> CoreResult<()> {
            self.sent.lock().push(message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_validation_hook_can_fill_headers() {
        let sender = ValidatingSender::new(RecordingSender::default(), |m| {
            m.headers.insert("stamped", "yes");
            Ok(())
        });

        sender.send(SenderMessage::new("hi")).await.unwrap();

        let sent = sender.inner().sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].headers.get_str("stamped").as_deref(), Some("yes"));
    }

    #[tokio::test]
    async fn test_rejected_message_is_not_forwarded() {
        let sender = ValidatingSender::new(RecordingSender::default(), |_| {
            Err(ValidationError::new("nope"))
        });

        let err = sender.send(SenderMessage::new("hi")).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(sender.inner().sent.lock().is_empty());
        assert_eq!(sender.name(), "recording");
    }
}
