//! Credential resolution strategies.
//!
//! A [`CredentialHandle`] holds the one active [`CredentialResolver`] for a
//! process (stdio mode) or for a single inbound request (multi-tenant HTTP
//! mode). The executor asks the handle for a fresh credential on every call,
//! so rotating the environment variable or installing a new strategy takes
//! effect on the next request without restarting anything.

use std::fmt;
use std::sync::{Arc, RwLock};

use secrecy::{ExposeSecret, SecretString};

/// Environment variable read by [`EnvCredential::default`].
pub const DEFAULT_TOKEN_ENV: &str = "SEODATA_API_TOKEN";

/// An opaque API token. Never printed by `Debug`.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Build a credential, rejecting empty or whitespace-only tokens.
    pub fn parse(token: impl AsRef<str>) -> Option<Self> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            None
        } else {
            Some(Self(SecretString::from(token.to_string())))
        }
    }

    /// Access the raw token for building the authorization header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Strategy returning the credential to use for the current call.
pub trait CredentialResolver: Send + Sync + fmt::Debug {
    /// Resolve the credential. `None` means no credential is configured.
    fn resolve(&self) -> Option<Credential>;

    /// Short label for logs.
    fn source(&self) -> &'static str;
}

/// A fixed token, e.g. from the config file or an inbound request header.
#[derive(Debug, Clone)]
pub struct StaticCredential(Credential);

impl StaticCredential {
    pub fn new(credential: Credential) -> Self {
        Self(credential)
    }
}

impl CredentialResolver for StaticCredential {
    fn resolve(&self) -> Option<Credential> {
        Some(self.0.clone())
    }

    fn source(&self) -> &'static str {
        "static"
    }
}

/// Reads a token from an environment variable on every resolution.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

impl CredentialResolver for EnvCredential {
    fn resolve(&self) -> Option<Credential> {
        std::env::var(&self.var).ok().and_then(Credential::parse)
    }

    fn source(&self) -> &'static str {
        "env"
    }
}

/// Always absent. Useful as an explicit "not configured" strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredential;

impl CredentialResolver for NoCredential {
    fn resolve(&self) -> Option<Credential> {
        None
    }

    fn source(&self) -> &'static str {
        "none"
    }
}

/// Shared, swappable holder of the active resolver strategy.
///
/// Clones share the same slot: [`install`](Self::install) on one clone is
/// visible through all of them. [`scoped`](Self::scoped) creates an
/// independent slot for a single request so overrides cannot leak.
#[derive(Clone)]
pub struct CredentialHandle {
    slot: Arc<RwLock<Arc<dyn CredentialResolver>>>,
}

impl CredentialHandle {
    pub fn new(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(resolver)),
        }
    }

    /// Independent handle that does not share this handle's slot.
    pub fn scoped(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self::new(resolver)
    }

    /// Replace the active strategy.
    pub fn install(&self, resolver: Arc<dyn CredentialResolver>) {
        tracing::debug!(source = resolver.source(), "Installing credential resolver");
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = resolver;
    }

    /// Resolve through the active strategy. Never cached.
    pub fn resolve(&self) -> Option<Credential> {
        self.current().resolve()
    }

    /// The active strategy.
    pub fn current(&self) -> Arc<dyn CredentialResolver> {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }
}

impl fmt::Debug for CredentialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHandle")
            .field("source", &self.current().source())
            .finish()
    }
}
