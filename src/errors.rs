//! Error types shared by key generation and verification.
//!
//! Parse and discipline errors carry enough detail for the caller to report
//! them precisely. Signature failures never do: a rejected key is reported as
//! a single undifferentiated `InvalidSignature`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LicenseError {
    /// The discipline selector (or key code) matches no registered discipline.
    #[error("unknown discipline: {0}")]
    UnknownDiscipline(String),

    /// The candidate key does not follow the key grammar.
    #[error("malformed license key: {0}")]
    MalformedKey(String),

    /// The key's signature does not match the recomputed one.
    #[error("license key signature invalid")]
    InvalidSignature,

    /// A `DEV-` key was presented to a production verifier.
    #[error("development keys are not accepted by this build")]
    DevKeyNotAllowed,

    /// The key belongs to a different discipline than the one requested.
    #[error("license is for discipline {found}, expected prefix {expected}-")]
    DisciplineMismatch { expected: String, found: String },

    /// A caller-supplied parameter is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The environment variable holding the signing secret is unset or empty.
    #[error("{0} not set in environment")]
    MissingSecret(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Result alias used throughout the crate.
pub type LicenseResult<T> = Result<T, LicenseError>;

impl LicenseError {
    /// Returns true for errors raised while checking a presented key, as
    /// opposed to errors in the request or the environment.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LicenseError::MalformedKey(_)
                | LicenseError::InvalidSignature
                | LicenseError::DevKeyNotAllowed
                | LicenseError::DisciplineMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_signature_message_has_no_detail() {
        assert_eq!(
            LicenseError::InvalidSignature.to_string(),
            "license key signature invalid"
        );
    }

    #[test]
    fn mismatch_names_expected_prefix() {
        let err = LicenseError::DisciplineMismatch {
            expected: "ES".to_string(),
            found: "GM".to_string(),
        };
        assert!(err.to_string().contains("expected prefix ES-"));
    }

    #[test]
    fn rejection_classification() {
        assert!(LicenseError::InvalidSignature.is_rejection());
        assert!(LicenseError::DevKeyNotAllowed.is_rejection());
        assert!(LicenseError::MalformedKey("x".into()).is_rejection());
        assert!(!LicenseError::UnknownDiscipline("x".into()).is_rejection());
        assert!(!LicenseError::MissingSecret("SS_LICENSE_SECRET".into()).is_rejection());
    }
}
