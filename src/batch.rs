//! Batch key generation.
//!
//! Expands a list of discipline selectors and a per-discipline count into
//! individual key requests. Each request succeeds or fails on its own; the
//! caller decides whether one unknown discipline aborts the whole batch.
//!
//! The device fingerprint of bound keys is resolved once per batch.

use crate::disciplines::{self, normalize};
use crate::errors::{LicenseError, LicenseResult};
use crate::license_key::DevKey;
use crate::secret::LicenseSecret;
use crate::signing::{Binding, Signer};

/// How the keys of a batch are produced.
#[derive(Debug, Clone, Copy)]
pub enum BatchMode<'a> {
    /// Signed production keys.
    Signed {
        secret: &'a LicenseSecret,
        bound: bool,
        body_length: usize,
        device_override: Option<&'a str>,
    },
    /// Unsigned `DEV-` keys; needs no secret.
    Development,
}

/// Keys requested for one selector.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The selector as given by the caller.
    pub selector: String,
    /// `count` rendered keys, or the reason the selector was refused.
    pub keys: LicenseResult<Vec<String>>,
}

/// Selectors for every registered discipline, each exactly once.
pub fn all_selectors() -> Vec<String> {
    disciplines::all()
        .iter()
        .map(|d| d.code.to_string())
        .collect()
}

/// Generate `count` keys for each selector.
///
/// # Errors
///
/// Returns [`LicenseError::InvalidArgument`] for a zero `count` or an empty
/// selector list. Per-selector failures are reported in the outcomes.
pub fn generate_batch(
    signer: &Signer,
    selectors: &[String],
    count: usize,
    mode: BatchMode<'_>,
) -> LicenseResult<Vec<BatchOutcome>> {
    if count == 0 {
        return Err(LicenseError::InvalidArgument(
            "count must be greater than 0".to_string(),
        ));
    }
    if selectors.is_empty() {
        return Err(LicenseError::InvalidArgument(
            "at least one discipline is required".to_string(),
        ));
    }

    let binding = match mode {
        BatchMode::Signed {
            bound,
            device_override,
            ..
        } => signer.binding(bound, device_override),
        BatchMode::Development => Binding::Unbound,
    };

    let mut rng = rand::rng();
    let outcomes = selectors
        .iter()
        .map(|selector| {
            let keys = normalize(selector).and_then(|info| {
                (0..count)
                    .map(|_| match mode {
                        BatchMode::Signed {
                            secret,
                            body_length,
                            ..
                        } => signer
                            .sign_random(secret, &info, &binding, body_length, &mut rng)
                            .map(|key| key.to_string()),
                        BatchMode::Development => {
                            Ok(DevKey::generate(&mut rng, info.code).to_string())
                        }
                    })
                    .collect::<LicenseResult<Vec<String>>>()
            });
            BatchOutcome {
                selector: selector.clone(),
                keys,
            }
        })
        .collect();

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::FingerprintProvider;
    use crate::verification::{Verifier, VerifierPolicy};

    fn signer() -> Signer {
        Signer::new(FingerprintProvider::with_sources(vec![]))
    }

    #[test]
    fn all_selectors_lists_each_discipline_once() {
        assert_eq!(all_selectors(), vec!["ES", "CS", "RS", "GM"]);
    }

    #[test]
    fn signed_batch_produces_count_keys_per_selector() {
        let secret = LicenseSecret::from("batch-secret");
        let selectors = vec!["es".to_string(), "Remote Sensing".to_string()];
        let mode = BatchMode::Signed {
            secret: &secret,
            bound: false,
            body_length: 16,
            device_override: None,
        };

        let outcomes = generate_batch(&signer(), &selectors, 3, mode).unwrap();
        assert_eq!(outcomes.len(), 2);

        let verifier = Verifier::new(
            FingerprintProvider::with_sources(vec![]),
            VerifierPolicy {
                accept_unbound: true,
                ..VerifierPolicy::default()
            },
        );
        for outcome in &outcomes {
            let keys = outcome.keys.as_ref().unwrap();
            assert_eq!(keys.len(), 3);
            for key in keys {
                assert!(verifier.verify(&secret, key).is_ok(), "{key} should verify");
            }
        }
    }

    #[test]
    fn unknown_selector_fails_alone() {
        let selectors = vec!["ES".to_string(), "geology".to_string()];
        let outcomes = generate_batch(&signer(), &selectors, 1, BatchMode::Development).unwrap();
        assert!(outcomes[0].keys.is_ok());
        assert_eq!(
            outcomes[1].keys.as_ref().unwrap_err(),
            &LicenseError::UnknownDiscipline("geology".to_string())
        );
    }

    #[test]
    fn development_batch_yields_dev_keys() {
        let outcomes =
            generate_batch(&signer(), &["CS".to_string()], 2, BatchMode::Development).unwrap();
        let keys = outcomes[0].keys.as_ref().unwrap();
        assert!(keys.iter().all(|k| k.starts_with("DEV-CS-")));
        assert!(keys.iter().all(|k| DevKey::parse(k).is_ok()));

        let production = Verifier::new(
            FingerprintProvider::with_sources(vec![]),
            VerifierPolicy::default(),
        );
        let secret = LicenseSecret::from("unused");
        assert!(keys
            .iter()
            .all(|k| production.verify(&secret, k) == Err(LicenseError::DevKeyNotAllowed)));
    }

    #[test]
    fn zero_count_and_empty_selectors_are_rejected() {
        assert!(generate_batch(&signer(), &["ES".to_string()], 0, BatchMode::Development).is_err());
        assert!(generate_batch(&signer(), &[], 1, BatchMode::Development).is_err());
    }
}
