//! INI file configuration adapter.

use crate::domain::error::DcaError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DcaError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| DcaError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, DcaError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| DcaError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// An adapter with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn invalid(section: &str, key: &str, reason: String) -> DcaError {
        DcaError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, DcaError> {
        match self.config.getint(section, key) {
            Ok(value) => Ok(value.unwrap_or(default)),
            Err(reason) => Err(Self::invalid(section, key, reason)),
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, DcaError> {
        match self.config.getfloat(section, key) {
            Ok(value) => Ok(value.unwrap_or(default)),
            Err(reason) => Err(Self::invalid(section, key, reason)),
        }
    }
}
