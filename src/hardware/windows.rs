use std::process::Command;

use super::{FingerprintSource, SourceError};

const CRYPTOGRAPHY_KEY: &str = r"HKLM\SOFTWARE\Microsoft\Cryptography";

/// `MachineGuid` from the Windows registry, read through `reg query`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryMachineGuid;

/// Extract the `MachineGuid` value from `reg query` output.
///
/// The relevant line looks like `    MachineGuid    REG_SZ    <guid>`.
pub fn parse_reg_query_output(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("MachineGuid"))
        .and_then(|line| line.split_whitespace().nth(2))
        .map(str::to_string)
}

impl FingerprintSource for RegistryMachineGuid {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn read(&self) -> Result<String, SourceError> {
        let output = Command::new("reg")
            .args(["query", CRYPTOGRAPHY_KEY, "/v", "MachineGuid"])
            .output()?;

        let result = String::from_utf8_lossy(&output.stdout);
        parse_reg_query_output(&result).ok_or(SourceError::NotFound)
    }
}
