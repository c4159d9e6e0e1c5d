use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;

use super::{FingerprintSource, SourceError};

/// Hardware UUID reported by `ioreg -rd1 -c IOPlatformExpertDevice`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IoregPlatformUuid;

fn platform_uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""IOPlatformUUID"\s*=\s*"([A-F0-9\-]+)""#).expect("static regex is valid")
    })
}

/// Extract the platform UUID from `ioreg` output.
pub fn parse_ioreg_output(output: &str) -> Option<String> {
    platform_uuid_pattern()
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl FingerprintSource for IoregPlatformUuid {
    fn name(&self) -> &'static str {
        "ioreg"
    }

    fn read(&self) -> Result<String, SourceError> {
        let output = Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()?;

        let result = String::from_utf8_lossy(&output.stdout);
        parse_ioreg_output(&result).ok_or(SourceError::NotFound)
    }
}
