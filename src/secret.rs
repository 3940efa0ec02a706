use std::fmt;

use serde::{Deserialize, Deserializer};

/// A wrapper that keeps endpoint credentials out of logs and error output.
///
/// `Secret<T>` holds bearer tokens, passwords and API keys used to
/// authenticate against an action endpoint. The value is only reachable
/// through [`expose_secret`](Self::expose_secret).
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, `Clone`, or `Serialize`
/// - Debug and Display output is always `[REDACTED]`
/// - Can be deserialized, so credentials load straight from configuration
///
/// # Examples
///
/// ```
/// use action_gate::Secret;
///
/// let token = Secret::new("sk-1234567890".to_string());
///
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(token.expose_secret(), "sk-1234567890");
/// ```
// Do NOT add Clone, Copy, Default or Serialize: each one lets a credential
// be duplicated or written out without going through expose_secret().
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// Only the dispatcher calls this, right before writing the credential
    /// into an outbound header.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Secret::new)
    }
}
