//! Sitekey - offline license keys for multi-discipline desktop applications
//!
//! Keys are generated without network access, are short enough to type, can
//! be bound to one machine, and are verified by the application with a shared
//! secret:
//!
//! ```text
//! ES-ABCD-1234-EFGH-5678-GOYPHBXJ4S
//! ^^ ^^^^^^^^^^^^^^^^^^^ ^^^^^^^^^^
//! |  random body         truncated HMAC-SHA256, base-32
//! discipline code
//! ```
//!
//! # Example
//!
//! ```rust
//! use sitekey::{sign, verify, LicenseSecret};
//!
//! let secret = LicenseSecret::from("topsecret");
//! let key = sign(&secret, "Remote Sensing", false, 16, None).unwrap();
//! let info = verify(&secret, &key.to_string(), false, None).unwrap();
//! assert_eq!(info.code, "RS");
//! ```

pub mod batch;
pub mod config;
pub mod disciplines;
pub mod errors;
pub mod hardware;
pub mod license_key;
pub mod logging;
pub mod mac;
pub mod secret;
pub mod signing;
pub mod verification;

pub use disciplines::{normalize, DisciplineInfo};
pub use errors::{LicenseError, LicenseResult};
pub use hardware::{current_fingerprint, DeviceFingerprint, FingerprintProvider};
pub use license_key::{DevKey, KeyFormat, LicenseKey, ParsedKey};
pub use secret::LicenseSecret;
pub use signing::{sign, Signer};
pub use verification::{verify, Verifier, VerifierMode, VerifierPolicy};
