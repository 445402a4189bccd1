use serde::{Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Password wrapper that never prints its value
///
/// `Debug` and `Display` print `[REDACTED]`. The buffer is zeroed on drop.
/// Serialization writes the plain value, since the login body is the only
/// place it is meant to go.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read-only access to the secret; do not log or store the result
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Login credentials for the API gateway
///
/// Serialized as `{"email": ..., "password": ...}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthCredentials {
    pub email: String,
    pub password: SecretString,
}

impl AuthCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// True when either field is empty
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.email.is_empty() || self.password.is_empty()
    }
}
