//! Key verification, the mirror of [`crate::signing`].
//!
//! Verification decodes the candidate, recomputes the binding token from the
//! *current* machine's fingerprint, re-derives the signature and compares it
//! in constant time. A mismatch is always reported as
//! [`LicenseError::InvalidSignature`], with no hint about which part differed.
//!
//! `DEV-` keys are rejected with [`LicenseError::DevKeyNotAllowed`] in
//! production mode before anything else about them is inspected.
//! `VerifierMode::Development` only exists when the crate is built with the
//! `dev-keys` feature; no configuration file or environment variable can
//! select it.

use tracing::debug;

use crate::config::LicenseConfig;
use crate::disciplines::{lookup_code, normalize, DisciplineInfo};
use crate::errors::{LicenseError, LicenseResult};
use crate::hardware::FingerprintProvider;
use crate::license_key::{is_dev_key, parse_key, KeyFormat, LicenseKey, ParsedKey, DEV_PREFIX};
use crate::mac::constant_time_eq;
use crate::secret::LicenseSecret;
use crate::signing::{compute_signature, Binding, KeyMessage};

/// Whether the verifying build accepts development keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifierMode {
    #[default]
    Production,
    #[cfg(feature = "dev-keys")]
    Development,
}

impl VerifierMode {
    /// Development mode, in builds compiled with the `dev-keys` feature.
    ///
    /// # Errors
    ///
    /// [`LicenseError::InvalidArgument`] in builds without the feature.
    pub fn development() -> LicenseResult<Self> {
        #[cfg(feature = "dev-keys")]
        {
            Ok(VerifierMode::Development)
        }
        #[cfg(not(feature = "dev-keys"))]
        {
            Err(LicenseError::InvalidArgument(
                "development keys are not supported by this build (enable the `dev-keys` feature)"
                    .to_string(),
            ))
        }
    }
}

/// What a [`Verifier`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifierPolicy {
    pub mode: VerifierMode,
    /// Try the unbound form when the bound form does not match.
    pub accept_unbound: bool,
    pub format: KeyFormat,
}

/// Only the key format comes from configuration. The mode is always
/// production and unbound keys are refused unless the application opts in
/// through code.
impl From<&LicenseConfig> for VerifierPolicy {
    fn from(config: &LicenseConfig) -> Self {
        Self {
            mode: VerifierMode::Production,
            accept_unbound: false,
            format: KeyFormat::from(config),
        }
    }
}

/// Application-side key verifier.
#[derive(Debug, Default)]
pub struct Verifier {
    provider: FingerprintProvider,
    policy: VerifierPolicy,
    device_override: Option<String>,
}

impl Verifier {
    pub fn new(provider: FingerprintProvider, policy: VerifierPolicy) -> Self {
        Self {
            provider,
            policy,
            device_override: None,
        }
    }

    /// Verify against an explicit fingerprint instead of the platform one.
    pub fn with_device_override(mut self, device: impl Into<String>) -> Self {
        self.device_override = Some(device.into()).filter(|d| !d.is_empty());
        self
    }

    pub fn policy(&self) -> &VerifierPolicy {
        &self.policy
    }

    /// Verify `candidate` in one explicit binding mode.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::DevKeyNotAllowed`] for `DEV-` keys in production mode
    /// - [`LicenseError::MalformedKey`] / [`LicenseError::UnknownDiscipline`] from decoding
    /// - [`LicenseError::InvalidSignature`] when the signature does not match
    pub fn verify_as(
        &self,
        secret: &LicenseSecret,
        candidate: &str,
        bound: bool,
    ) -> LicenseResult<DisciplineInfo> {
        let (parsed, info) = self.decode(candidate)?;
        let ParsedKey::Production(key) = parsed else {
            debug!(code = info.code, "development key accepted");
            return Ok(info);
        };

        let binding = self.binding(bound);
        if self.matches(secret, &key, &info, &binding) {
            Ok(info)
        } else {
            Err(LicenseError::InvalidSignature)
        }
    }

    /// Verify `candidate` according to the policy: the bound form first, then
    /// the unbound form if `accept_unbound` is set.
    pub fn verify(&self, secret: &LicenseSecret, candidate: &str) -> LicenseResult<DisciplineInfo> {
        let (parsed, info) = self.decode(candidate)?;
        let ParsedKey::Production(key) = parsed else {
            debug!(code = info.code, "development key accepted");
            return Ok(info);
        };

        if self.matches(secret, &key, &info, &self.binding(true)) {
            debug!(code = info.code, "bound key accepted");
            return Ok(info);
        }
        if self.policy.accept_unbound && self.matches(secret, &key, &info, &Binding::Unbound) {
            debug!(code = info.code, "unbound key accepted");
            return Ok(info);
        }

        debug!(code = info.code, "key rejected");
        Err(LicenseError::InvalidSignature)
    }

    /// Verify `candidate` as a key for the discipline selected by `expected`.
    ///
    /// # Errors
    ///
    /// In addition to the errors of [`Verifier::verify`], returns
    /// [`LicenseError::DisciplineMismatch`] when the key's code differs.
    pub fn verify_for(
        &self,
        secret: &LicenseSecret,
        expected: &str,
        candidate: &str,
    ) -> LicenseResult<DisciplineInfo> {
        self.expect_discipline(expected, candidate)?;
        self.verify(secret, candidate)
    }

    /// Check that `candidate` carries the code of the discipline selected by
    /// `expected`, without looking at the signature.
    pub fn expect_discipline(&self, expected: &str, candidate: &str) -> LicenseResult<DisciplineInfo> {
        let expected = normalize(expected)?;
        if self.policy.mode == VerifierMode::Production && is_dev_key(candidate) {
            return Err(LicenseError::DevKeyNotAllowed);
        }

        let found = key_code(candidate);
        if !found.eq_ignore_ascii_case(expected.code) {
            return Err(LicenseError::DisciplineMismatch {
                expected: expected.code.to_string(),
                found: found.to_ascii_uppercase(),
            });
        }
        Ok(expected)
    }

    fn binding(&self, bound: bool) -> Binding {
        if bound {
            Binding::Bound(
                self.provider
                    .current_fingerprint(self.device_override.as_deref()),
            )
        } else {
            Binding::Unbound
        }
    }

    /// Parse either kind of key. Production mode refuses `DEV-` input before
    /// parsing it.
    fn decode(&self, candidate: &str) -> LicenseResult<(ParsedKey, DisciplineInfo)> {
        if self.policy.mode == VerifierMode::Production && is_dev_key(candidate) {
            return Err(LicenseError::DevKeyNotAllowed);
        }
        let parsed = parse_key(candidate, &self.policy.format)?;
        let info = lookup_code(parsed.code())
            .ok_or_else(|| LicenseError::UnknownDiscipline(parsed.code().to_string()))?;
        Ok((parsed, info))
    }

    fn matches(
        &self,
        secret: &LicenseSecret,
        key: &LicenseKey,
        info: &DisciplineInfo,
        binding: &Binding,
    ) -> bool {
        let message = KeyMessage::new(info, &key.body, binding);
        let expected = compute_signature(secret, &message);
        constant_time_eq(expected.as_bytes(), key.signature.as_bytes())
    }
}

/// The code segment of a production or development key, unvalidated.
fn key_code(candidate: &str) -> &str {
    let candidate = candidate.trim();
    let rest = if is_dev_key(candidate) {
        &candidate[DEV_PREFIX.len()..]
    } else {
        candidate
    };
    rest.split('-').next().unwrap_or_default()
}

/// Verify a production key in one binding mode using the platform
/// fingerprint (or `device_override`).
pub fn verify(
    secret: &LicenseSecret,
    candidate: &str,
    bound: bool,
    device_override: Option<&str>,
) -> LicenseResult<DisciplineInfo> {
    let mut verifier = Verifier::default();
    if let Some(device) = device_override {
        verifier = verifier.with_device_override(device);
    }
    verifier.verify_as(secret, candidate, bound)
}
