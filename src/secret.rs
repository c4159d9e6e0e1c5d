//! The shared signing secret.
//!
//! The secret is a capability passed explicitly into signing and
//! verification. It is never stored globally, never logged, and has no
//! `Display` implementation.

use std::env;
use std::fmt;

use crate::errors::{LicenseError, LicenseResult};

/// Environment variable the generator reads the secret from by default.
pub const DEFAULT_SECRET_ENV: &str = "SS_LICENSE_SECRET";

#[derive(Clone, PartialEq, Eq)]
pub struct LicenseSecret(Vec<u8>);

impl LicenseSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Read the secret from the named environment variable (UTF-8 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MissingSecret`] if the variable is unset or empty.
    pub fn from_env(var: &str) -> LicenseResult<Self> {
        match env::var(var) {
            Ok(value) if !value.is_empty() => Ok(Self(value.into_bytes())),
            _ => Err(LicenseError::MissingSecret(var.to_string())),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for LicenseSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LicenseSecret(<redacted>)")
    }
}

impl From<&[u8]> for LicenseSecret {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for LicenseSecret {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = LicenseSecret::from("topsecret");
        let shown = format!("{secret:?}");
        assert!(!shown.contains("topsecret"));
        assert_eq!(shown, "LicenseSecret(<redacted>)");
    }

    #[test]
    fn bytes_are_kept_verbatim() {
        let secret = LicenseSecret::new(vec![0u8, 159, 146, 150]);
        assert_eq!(secret.as_bytes(), &[0u8, 159, 146, 150]);
    }

    #[test]
    fn missing_env_var_is_reported_by_name() {
        let err = LicenseSecret::from_env("SITEKEY_TEST_SECRET_THAT_IS_NEVER_SET").unwrap_err();
        assert_eq!(
            err,
            LicenseError::MissingSecret("SITEKEY_TEST_SECRET_THAT_IS_NEVER_SET".to_string())
        );
    }
}
