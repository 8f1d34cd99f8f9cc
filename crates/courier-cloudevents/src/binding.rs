//! Protocol bindings: mapping canonical attribute names to transport header names.
//!
//! The process-wide default binding is resolved lazily and cached. A host may replace it
//! exactly once with [`set_default_binding`], and only before anything has resolved it.
//! Every API that accepts `Option<&dyn ProtocolBinding>` treats `None` as "the default
//! binding at call time".

use std::borrow::Cow;
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CloudEventError, CloudEventResult};

/// Maps a cloud event attribute name to the header name used by a transport.
///
/// Implementations must be pure.
pub trait ProtocolBinding: Debug + Send + Sync {
    /// Returns the header name for `attribute`.
    fn header_name<'a>(&self, attribute: &'a str) -> Cow<'a, str>;
}

/// Uses the attribute name verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityBinding;

impl ProtocolBinding for IdentityBinding {
    fn header_name<'a>(&self, attribute: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(attribute)
    }
}

/// Prepends a fixed prefix to every attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedBinding {
    prefix: String,
}

impl PrefixedBinding {
    /// Creates a binding with a custom prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// HTTP binary mode (`ce-id`, `ce-source`, ...).
    pub fn http() -> Self {
        Self::new("ce-")
    }

    /// Kafka binary mode (`ce_id`, `ce_source`, ...).
    pub fn kafka() -> Self {
        Self::new("ce_")
    }

    /// AMQP application properties (`cloudEvents:id`, ...).
    pub fn amqp() -> Self {
        Self::new("cloudEvents:")
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl ProtocolBinding for PrefixedBinding {
    fn header_name<'a>(&self, attribute: &'a str) -> Cow<'a, str> {
        Cow::Owned(format!("{}{}", self.prefix, attribute))
    }
}

/// Binding selection for configuration files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BindingKind {
    /// [`IdentityBinding`].
    #[default]
    Identity,
    /// [`PrefixedBinding::http`].
    Http,
    /// [`PrefixedBinding::kafka`].
    Kafka,
    /// [`PrefixedBinding::amqp`].
    Amqp,
    /// [`PrefixedBinding::new`].
    Prefixed {
        /// Header prefix.
        prefix: String,
    },
}

impl BindingKind {
    /// Builds the binding this kind describes.
    pub fn build(&self) -> Arc<dyn ProtocolBinding> {
        match self {
            Self::Identity => Arc::new(IdentityBinding),
            Self::Http => Arc::new(PrefixedBinding::http()),
            Self::Kafka => Arc::new(PrefixedBinding::kafka()),
            Self::Amqp => Arc::new(PrefixedBinding::amqp()),
            Self::Prefixed { prefix } => Arc::new(PrefixedBinding::new(prefix.clone())),
        }
    }
}

// =============================================================================
// Process Default
// =============================================================================

static DEFAULT_BINDING: OnceLock<Arc<dyn ProtocolBinding>> = OnceLock::new();

/// Returns the process default binding, resolving it to [`IdentityBinding`] on first use.
pub fn default_binding() -> Arc<dyn ProtocolBinding> {
    DEFAULT_BINDING
        .get_or_init(|| Arc::new(IdentityBinding))
        .clone()
}

/// Replaces the process default binding.
///
/// Must be called at most once, before anything resolves the default.
pub fn set_default_binding(binding: Arc<dyn ProtocolBinding>) -> CloudEventResult<()> {
    debug!(binding = ?binding, "Setting default protocol binding");
    DEFAULT_BINDING
        .set(binding)
        .map_err(|_| CloudEventError::DefaultBindingLocked)
}

/// A binding borrowed from the caller or taken from the process default.
pub(crate) enum ResolvedBinding<'a> {
    Borrowed(&'a dyn ProtocolBinding),
    Default(Arc<dyn ProtocolBinding>),
}

impl<'a> Deref for ResolvedBinding<'a> {
    type Target = dyn ProtocolBinding + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(b) => *b,
            Self::Default(b) => b.as_ref(),
        }
    }
}

/// Resolves an optional binding against the current default.
pub(crate) fn resolve(binding: Option<&dyn ProtocolBinding>) -> ResolvedBinding<'_> {
    match binding {
        Some(b) => ResolvedBinding::Borrowed(b),
        None => ResolvedBinding::Default(default_binding()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_binding() {
        assert_eq!(IdentityBinding.header_name("source"), "source");
    }

    #[test]
    fn test_prefixed_bindings() {
        assert_eq!(PrefixedBinding::http().header_name("id"), "ce-id");
        assert_eq!(PrefixedBinding::kafka().header_name("type"), "ce_type");
        assert_eq!(PrefixedBinding::amqp().header_name("time"), "cloudEvents:time");
    }

    #[test]
    fn test_default_is_set_once() {
        let resolved = default_binding();
        assert_eq!(resolved.header_name("subject"), "subject");

        let err = set_default_binding(Arc::new(PrefixedBinding::kafka())).unwrap_err();
        assert_eq!(err, CloudEventError::DefaultBindingLocked);
        assert_eq!(default_binding().header_name("subject"), "subject");
    }

    #[test]
    fn test_explicit_binding_wins() {
        let kafka = PrefixedBinding::kafka();
        assert_eq!(resolve(Some(&kafka)).header_name("id"), "ce_id");
        assert_eq!(resolve(None).header_name("id"), "id");
    }

    #[test]
    fn test_binding_kind_build() {
        assert_eq!(BindingKind::Http.build().header_name("id"), "ce-id");
        let custom = BindingKind::Prefixed {
            prefix: "x-".into(),
        };
        assert_eq!(custom.build().header_name("id"), "x-id");
    }
}
