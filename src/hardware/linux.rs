use std::fs;
use std::path::PathBuf;

use super::{FingerprintSource, SourceError};

/// A systemd/dbus machine-id file.
#[derive(Debug, Clone)]
pub struct MachineIdFile {
    name: &'static str,
    path: PathBuf,
}

impl MachineIdFile {
    /// `/etc/machine-id`
    pub fn etc() -> Self {
        Self::at("machine-id", "/etc/machine-id")
    }

    /// `/var/lib/dbus/machine-id`
    pub fn dbus() -> Self {
        Self::at("dbus-machine-id", "/var/lib/dbus/machine-id")
    }

    pub fn at(name: &'static str, path: impl Into<PathBuf>) -> Self {
        Self {
            name,
            path: path.into(),
        }
    }
}

impl FingerprintSource for MachineIdFile {
    fn name(&self) -> &'static str {
        self.name
    }

    fn read(&self) -> Result<String, SourceError> {
        let contents = fs::read_to_string(&self.path)?;
        let id = contents.trim();
        if id.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_and_trims_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "4c4c4544004a3510804bb4c04f394d32").unwrap();

        let source = MachineIdFile::at("test", file.path());
        assert_eq!(source.read().unwrap(), "4c4c4544004a3510804bb4c04f394d32");
    }

    #[test]
    fn empty_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = MachineIdFile::at("test", file.path());
        assert!(matches!(source.read(), Err(SourceError::Empty)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let source = MachineIdFile::at("test", "/nonexistent/sitekey/machine-id");
        assert!(matches!(source.read(), Err(SourceError::Io(_))));
    }
}
