//! # Application-Side Verification Example
//!
//! This example shows how the desktop application checks a key the user
//! typed for the discipline they selected, entirely offline.
//!
//! ## Key Concepts
//!
//! 1. **Discipline prefix**: a key is only valid for the discipline whose code
//!    it starts with (`ES-`, `CS-`, `RS-`, `GM-`).
//!
//! 2. **Machine binding**: bound keys are checked against this machine's
//!    fingerprint. Run `sitekey fingerprint` to see it.
//!
//! 3. **Dev keys**: `DEV-` keys are only accepted by a development build,
//!    compiled with `--features dev-build`.
//!
//! ## Running This Example
//!
//! ```bash
//! export SS_LICENSE_SECRET=topsecret
//! LICENSE_KEY="ES-ABCD-1234-EFGH-5678-GOYPHBXJ4S" cargo run -- "Engineering Surveying"
//! LICENSE_KEY="DEV-CS-ABCD1234EFGH" cargo run --features dev-build -- "Cadastral Surveying"
//! ```

use std::io::{self, Write};

use sitekey::{
    FingerprintProvider, LicenseError, LicenseSecret, Verifier, VerifierMode, VerifierPolicy,
};

/// Get the license key from the LICENSE_KEY environment variable or a prompt.
fn get_license_key() -> io::Result<String> {
    if let Ok(key) = std::env::var("LICENSE_KEY") {
        return Ok(key.trim().to_string());
    }

    print!("License Key: ");
    io::stdout().flush()?;

    let mut key = String::new();
    io::stdin().read_line(&mut key)?;
    Ok(key.trim().to_string())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let discipline = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "Engineering Surveying".to_string());

    let policy = VerifierPolicy {
        mode: if cfg!(feature = "dev-build") {
            match VerifierMode::development() {
                Ok(mode) => mode,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(2);
                }
            }
        } else {
            VerifierMode::Production
        },
        // Whether unbound keys are accepted is decided when the app is built.
        accept_unbound: true,
        ..VerifierPolicy::default()
    };

    // In a shipped build the secret is provisioned at build time, never typed
    // by the user. The environment stands in for that here.
    let secret = match LicenseSecret::from_env("SS_LICENSE_SECRET") {
        Ok(secret) => secret,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let key = match get_license_key() {
        Ok(key) if key.len() >= 8 => key,
        _ => {
            eprintln!("Please enter a valid license key.");
            std::process::exit(1);
        }
    };

    let verifier = Verifier::new(FingerprintProvider::platform(), policy);
    match verifier.verify_for(&secret, &discipline, &key) {
        Ok(info) => println!("License accepted for {}. Welcome!", info.long_name),
        Err(LicenseError::DisciplineMismatch { expected, .. }) => {
            eprintln!("Invalid license for {discipline} (expected prefix {expected}-).");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("License verification failed: {e}");
            std::process::exit(1);
        }
    }
}
