//! Configuration manager for directory settings.
//!
//! Reads the `ldaps` section of a YAML document:
//!
//! ```yaml
//! ldaps:
//!   - name: ldap1
//!     host: ldap.example.com
//!     search_user_base_DN: "ou=People,dc=example,dc=com"
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Mapping;

use crate::error::ConfigError;
use crate::ldap::{DirectoryServerConfig, Named};
use crate::raw::RawSettings;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    ldaps: Vec<Mapping>,
}

/// Every directory declared in a settings document, in declaration order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Configuration {
    path: PathBuf,
    directories: Vec<DirectoryServerConfig>,
}

impl Configuration {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Reads the settings file from the configured path, or `config.yaml`
    /// when none was given.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the file cannot be read or parsed, or if any
    /// directory block is malformed.
    pub fn read(self) -> Result<Self, ConfigError> {
        let file_path = if self.path.as_os_str().is_empty() {
            Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        } else {
            self.path
        };

        let document: Document = serde_yaml::from_reader(File::open(&file_path)?)?;
        let mut config = Self::from_document(document)?;
        config.path = file_path;

        Ok(config)
    }

    /// Parse settings from an in-memory YAML document.
    ///
    /// # Errors
    ///
    /// Same as [`Configuration::read`], without the file access.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Self::from_document(serde_yaml::from_str(source)?)
    }

    fn from_document(document: Document) -> Result<Self, ConfigError> {
        let mut names = HashSet::new();
        let mut directories = Vec::with_capacity(document.ldaps.len());

        for (index, block) in document.ldaps.into_iter().enumerate() {
            let config = DirectoryServerConfig::from_settings(&RawSettings::new(block))
                .map_err(|source| {
                    tracing::warn!(index, error = %source, "directory settings rejected");
                    ConfigError::Malformed { index, source }
                })?;

            if !names.insert(config.name().to_owned()) {
                return Err(ConfigError::DuplicateName(config.name().to_owned()));
            }

            tracing::debug!(
                name = config.name(),
                mode = config.mode_kind(),
                ha = %config.ha(),
                "directory settings validated"
            );
            directories.push(config);
        }

        Ok(Self {
            path: PathBuf::new(),
            directories,
        })
    }

    /// File the settings were read from, empty for in-memory documents.
    pub fn source(&self) -> &Path {
        &self.path
    }

    /// Directory referenced by `name` in access rules.
    pub fn get(&self, name: &str) -> Option<&DirectoryServerConfig> {
        self.directories.iter().find(|d| d.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirectoryServerConfig> {
        self.directories.iter()
    }

    pub fn len(&self) -> usize {
        self.directories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}
