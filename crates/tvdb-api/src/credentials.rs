//! Credential sources.
//!
//! The client needs three secrets: the API key, the user key and the user
//! name. Values given explicitly to the builder always win; anything left
//! unset is looked up by label through a [`CredentialSource`].

use std::fmt;

/// Label of the API key secret.
pub const API_KEY_LABEL: &str = "libtvdb_api_key";

/// Label of the user key secret.
pub const USER_KEY_LABEL: &str = "libtvdb_user_key";

/// Label of the user name secret.
pub const USER_NAME_LABEL: &str = "libtvdb_user_name";

/// Looks up a secret by label.
///
/// Implementations return `None` when the secret is unknown. They must not
/// panic; a lookup failure is simply an absent value.
pub trait CredentialSource {
    /// Resolves the secret stored under `label`.
    fn resolve(&self, label: &str) -> Option<String>;
}

impl<F> CredentialSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, label: &str) -> Option<String> {
        self(label)
    }
}

/// Reads secrets from environment variables named after the upper-cased label
/// (`libtvdb_api_key` → `LIBTVDB_API_KEY`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    /// Returns the environment variable name used for `label`.
    #[must_use]
    pub fn var_name(label: &str) -> String {
        label.to_ascii_uppercase()
    }
}

impl CredentialSource for EnvCredentials {
    fn resolve(&self, label: &str) -> Option<String> {
        std::env::var(Self::var_name(label)).ok()
    }
}

/// Tries several sources in order and returns the first non-empty value.
#[derive(Default)]
pub struct ChainedCredentials {
    sources: Vec<Box<dyn CredentialSource + Send + Sync>>,
}

impl ChainedCredentials {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source to the end of the chain.
    #[must_use]
    pub fn with(mut self, source: impl CredentialSource + Send + Sync + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl fmt::Debug for ChainedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedCredentials")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl CredentialSource for ChainedCredentials {
    fn resolve(&self, label: &str) -> Option<String> {
        self.sources
            .iter()
            .find_map(|source| source.resolve(label).filter(|value| !value.is_empty()))
    }
}

/// Reads secrets from the platform keychain.
///
/// Each label is stored as its own entry under the configured service name.
/// The `libtvdb_*` labels match entries written by earlier libtvdb releases.
#[cfg(feature = "keyring")]
#[derive(Debug, Clone)]
pub struct KeyringCredentials {
    service: String,
}

#[cfg(feature = "keyring")]
impl KeyringCredentials {
    /// Creates a keychain source for the given service name.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

#[cfg(feature = "keyring")]
impl CredentialSource for KeyringCredentials {
    fn resolve(&self, label: &str) -> Option<String> {
        let entry = match keyring::Entry::new(&self.service, label) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(label, error = %e, "Keychain entry unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(secret) => Some(secret),
            Err(e) => {
                tracing::debug!(label, error = %e, "Keychain lookup failed");
                None
            }
        }
    }
}

/// The three secrets needed to log in.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Credentials {
    pub(crate) api_key: String,
    pub(crate) user_key: String,
    pub(crate) user_name: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("user_key", &"<redacted>")
            .field("user_name", &self.user_name)
            .finish()
    }
}

/// Returns the explicit value if non-empty, otherwise asks the source.
pub(crate) fn resolve_secret(
    explicit: Option<String>,
    source: Option<&(dyn CredentialSource + Send + Sync)>,
    label: &str,
) -> Option<String> {
    explicit
        .filter(|value| !value.is_empty())
        .or_else(|| source.and_then(|s| s.resolve(label)))
        .filter(|value| !value.is_empty())
}
