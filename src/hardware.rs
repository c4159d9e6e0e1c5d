//! Device fingerprinting for key binding.
//!
//! The fingerprint is an opaque string identifying the current machine. It is
//! resolved from an ordered chain of [`FingerprintSource`]s; the first source
//! that yields a non-empty value wins. Individual sources are expected to fail
//! on some platforms, so failures are logged and skipped, never returned.
//!
//! Resolution order for [`FingerprintProvider::current_fingerprint`]:
//!
//! 1. a non-empty explicit override;
//! 2. the platform sources (machine-id files, `ioreg`, the registry);
//! 3. the network hostname;
//! 4. the constant [`FALLBACK_FINGERPRINT`].

use std::fmt;

use thiserror::Error;

pub mod linux;
pub mod macos;
pub mod windows;

/// Value used when every source failed, including the hostname.
pub const FALLBACK_FINGERPRINT: &str = "unknown-host";

/// Why a single source produced nothing. Only ever logged.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source returned an empty value")]
    Empty,
    #[error("identifier not found in output")]
    NotFound,
    #[error("not available on this platform")]
    Unsupported,
}

/// One way of obtaining a machine identifier.
pub trait FingerprintSource {
    /// Short name recorded in [`DeviceFingerprint::source`].
    fn name(&self) -> &'static str;

    /// Read the identifier. The provider trims the value and skips it if empty.
    fn read(&self) -> Result<String, SourceError>;
}

/// The resolved binding token for this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFingerprint {
    pub value: String,
    pub source: &'static str,
}

impl DeviceFingerprint {
    /// A fingerprint supplied by the caller rather than read from the machine.
    pub fn from_override(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: "override",
        }
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Network hostname, the last real source in every chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostnameSource;

impl FingerprintSource for HostnameSource {
    fn name(&self) -> &'static str {
        "hostname"
    }

    fn read(&self) -> Result<String, SourceError> {
        let name = hostname::get()?;
        name.into_string().map_err(|_| SourceError::NotFound)
    }
}

/// Ordered chain of fingerprint sources.
pub struct FingerprintProvider {
    sources: Vec<Box<dyn FingerprintSource + Send + Sync>>,
}

impl FingerprintProvider {
    /// Build a provider from an explicit source list (tried in order).
    pub fn with_sources(sources: Vec<Box<dyn FingerprintSource + Send + Sync>>) -> Self {
        Self { sources }
    }

    /// The chain for the platform this binary was built for, ending with the
    /// hostname.
    pub fn platform() -> Self {
        let mut sources: Vec<Box<dyn FingerprintSource + Send + Sync>> = Vec::new();

        #[cfg(target_os = "linux")]
        {
            sources.push(Box::new(linux::MachineIdFile::etc()));
            sources.push(Box::new(linux::MachineIdFile::dbus()));
        }
        #[cfg(target_os = "macos")]
        {
            sources.push(Box::new(macos::IoregPlatformUuid));
        }
        #[cfg(target_os = "windows")]
        {
            sources.push(Box::new(windows::RegistryMachineGuid));
        }

        sources.push(Box::new(HostnameSource));
        Self { sources }
    }

    /// Names of the configured sources, in order.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve the fingerprint. Never fails.
    pub fn current_fingerprint(&self, device_override: Option<&str>) -> DeviceFingerprint {
        if let Some(value) = device_override.filter(|v| !v.is_empty()) {
            return DeviceFingerprint::from_override(value);
        }

        for source in &self.sources {
            match source.read() {
                Ok(value) => {
                    let value = value.trim();
                    if !value.is_empty() {
                        return DeviceFingerprint {
                            value: value.to_string(),
                            source: source.name(),
                        };
                    }
                    log::debug!("Fingerprint source {} returned an empty value", source.name());
                }
                Err(e) => {
                    log::debug!("Fingerprint source {} failed: {}, trying next", source.name(), e);
                }
            }
        }

        log::debug!("All fingerprint sources failed, using fallback");
        DeviceFingerprint {
            value: FALLBACK_FINGERPRINT.to_string(),
            source: "fallback",
        }
    }
}

impl Default for FingerprintProvider {
    fn default() -> Self {
        Self::platform()
    }
}

impl fmt::Debug for FingerprintProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintProvider")
            .field("sources", &self.source_names())
            .finish()
    }
}

/// Resolve the current machine's fingerprint with the platform chain.
pub fn current_fingerprint(device_override: Option<&str>) -> DeviceFingerprint {
    FingerprintProvider::platform().current_fingerprint(device_override)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Result<&'static str, ()>);

    impl FingerprintSource for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn read(&self) -> Result<String, SourceError> {
            self.1.map(str::to_string).map_err(|_| SourceError::Unsupported)
        }
    }

    fn provider(sources: Vec<Fixed>) -> FingerprintProvider {
        FingerprintProvider::with_sources(
            sources
                .into_iter()
                .map(|s| Box::new(s) as Box<dyn FingerprintSource + Send + Sync>)
                .collect(),
        )
    }

    #[test]
    fn override_wins() {
        let p = provider(vec![Fixed("a", Ok("machine-a"))]);
        let fp = p.current_fingerprint(Some("customer-box"));
        assert_eq!(fp.value, "customer-box");
        assert_eq!(fp.source, "override");
    }

    #[test]
    fn empty_override_is_ignored() {
        let p = provider(vec![Fixed("a", Ok("machine-a"))]);
        assert_eq!(p.current_fingerprint(Some("")).value, "machine-a");
    }

    #[test]
    fn first_successful_source_wins() {
        let p = provider(vec![
            Fixed("broken", Err(())),
            Fixed("blank", Ok("  \n")),
            Fixed("good", Ok(" abc123\n")),
            Fixed("later", Ok("never-used")),
        ]);
        let fp = p.current_fingerprint(None);
        assert_eq!(fp.value, "abc123");
        assert_eq!(fp.source, "good");
    }

    #[test]
    fn all_failures_degrade_to_fallback() {
        let p = provider(vec![Fixed("broken", Err(()))]);
        let fp = p.current_fingerprint(None);
        assert_eq!(fp.value, FALLBACK_FINGERPRINT);
        assert_eq!(fp.source, "fallback");

        let empty = provider(vec![]);
        assert_eq!(empty.current_fingerprint(None).source, "fallback");
    }

    #[test]
    fn platform_chain_ends_with_hostname() {
        let p = FingerprintProvider::platform();
        assert_eq!(p.source_names().last(), Some(&"hostname"));
    }

    #[test]
    fn platform_fingerprint_is_stable_and_non_empty() {
        let a = current_fingerprint(None);
        let b = current_fingerprint(None);
        assert!(!a.value.is_empty());
        assert_eq!(a, b);
    }
}
