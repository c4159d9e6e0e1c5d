//! Key derivation and signing.
//!
//! A production key signs the message
//!
//! ```text
//! code|long_name|body|token
//! ```
//!
//! where `token` is [`PEPPER`] followed by the device fingerprint for bound
//! keys, or [`UNBOUND_SENTINEL`] for unbound keys. The signature is
//! HMAC-SHA256 over the UTF-8 message, base-32 encoded without padding and
//! truncated to [`SIGNATURE_LENGTH`] characters.
//!
//! The message layout is a wire contract: changing field order, the
//! delimiter, casing, or the pepper invalidates every key already issued.
//! Bump the pepper version when the layout must change.
//!
//! Unbound keys all use the same public sentinel, so an unbound key for a
//! given discipline, body and secret always carries the same signature. That
//! is intended: unbound keys are valid on every machine.

use rand::Rng;
use tracing::debug;

use crate::disciplines::{normalize, DisciplineInfo};
use crate::errors::{LicenseError, LicenseResult};
use crate::hardware::{DeviceFingerprint, FingerprintProvider};
use crate::license_key::{generate_body, DevKey, LicenseKey, SIGNATURE_LENGTH};
use crate::mac::{base32_nopad, hmac_sha256};
use crate::secret::LicenseSecret;

/// Versioned prefix mixed into the binding token of bound keys.
pub const PEPPER: &str = "SS-PEPPER-v1";

/// Binding token of unbound keys.
pub const UNBOUND_SENTINEL: &str = "*";

/// Field delimiter of the signed message. Never appears in any field.
pub const MESSAGE_DELIMITER: char = '|';

/// What a key is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Bound(DeviceFingerprint),
    Unbound,
}

impl Binding {
    /// The token placed in the last message field.
    pub fn token(&self) -> String {
        match self {
            Binding::Bound(fp) => format!("{PEPPER}{}", fp.value),
            Binding::Unbound => UNBOUND_SENTINEL.to_string(),
        }
    }
}

/// The ordered tuple of fields covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMessage<'a> {
    pub code: &'a str,
    pub long_name: &'a str,
    pub body: &'a str,
    pub token: String,
}

impl<'a> KeyMessage<'a> {
    pub fn new(discipline: &DisciplineInfo, body: &'a str, binding: &Binding) -> Self {
        Self {
            code: discipline.code,
            long_name: discipline.long_name,
            body,
            token: binding.token(),
        }
    }

    /// Serialized message bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let d = MESSAGE_DELIMITER;
        format!("{}{d}{}{d}{}{d}{}", self.code, self.long_name, self.body, self.token).into_bytes()
    }
}

/// Compute the presentable signature of a message.
pub fn compute_signature(secret: &LicenseSecret, message: &KeyMessage<'_>) -> String {
    let mac = hmac_sha256(secret.as_bytes(), &message.to_bytes());
    let mut encoded = base32_nopad(&mac);
    encoded.truncate(SIGNATURE_LENGTH);
    encoded
}

/// Generates keys, resolving bound keys' fingerprints through a provider.
#[derive(Debug, Default)]
pub struct Signer {
    provider: FingerprintProvider,
}

impl Signer {
    pub fn new(provider: FingerprintProvider) -> Self {
        Self { provider }
    }

    /// Resolve the binding for a new key.
    pub fn binding(&self, bound: bool, device_override: Option<&str>) -> Binding {
        if bound {
            Binding::Bound(self.provider.current_fingerprint(device_override))
        } else {
            Binding::Unbound
        }
    }

    /// Sign a key for `discipline` with a fresh random body.
    ///
    /// # Errors
    ///
    /// [`LicenseError::UnknownDiscipline`] if the selector does not resolve,
    /// [`LicenseError::InvalidArgument`] if `body_length` is zero.
    pub fn sign(
        &self,
        secret: &LicenseSecret,
        discipline: &str,
        bound: bool,
        body_length: usize,
        device_override: Option<&str>,
    ) -> LicenseResult<LicenseKey> {
        let info = normalize(discipline)?;
        let binding = self.binding(bound, device_override);
        self.sign_random(secret, &info, &binding, body_length, &mut rand::rng())
    }

    /// Sign with an already-resolved discipline and binding and a caller RNG.
    pub fn sign_random<R: Rng + ?Sized>(
        &self,
        secret: &LicenseSecret,
        info: &DisciplineInfo,
        binding: &Binding,
        body_length: usize,
        rng: &mut R,
    ) -> LicenseResult<LicenseKey> {
        if body_length == 0 {
            return Err(LicenseError::InvalidArgument(
                "body length must be greater than 0".to_string(),
            ));
        }
        let body = generate_body(rng, body_length);
        Ok(self.sign_with_body(secret, info, &body, binding))
    }

    /// Deterministic signing of a given body.
    pub fn sign_with_body(
        &self,
        secret: &LicenseSecret,
        info: &DisciplineInfo,
        body: &str,
        binding: &Binding,
    ) -> LicenseKey {
        let message = KeyMessage::new(info, body, binding);
        let signature = compute_signature(secret, &message);

        match binding {
            Binding::Bound(fp) => debug!(code = info.code, fingerprint_source = fp.source, "signed bound key"),
            Binding::Unbound => debug!(code = info.code, "signed unbound key"),
        }

        LicenseKey {
            code: info.code.to_string(),
            body: body.to_string(),
            signature,
        }
    }
}

/// Sign a key using the platform fingerprint chain.
pub fn sign(
    secret: &LicenseSecret,
    discipline: &str,
    bound: bool,
    body_length: usize,
    device_override: Option<&str>,
) -> LicenseResult<LicenseKey> {
    Signer::default().sign(secret, discipline, bound, body_length, device_override)
}

/// Generate an unsigned development key.
pub fn make_dev_key(discipline: &str) -> LicenseResult<DevKey> {
    let info = normalize(discipline)?;
    Ok(DevKey::generate(&mut rand::rng(), info.code))
}
