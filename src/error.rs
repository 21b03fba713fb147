//! Error handler for directory settings.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigurationMalformed>;

/// A directory settings block violates one of the construction rules.
///
/// Every variant is raised before any connection is attempted. No partial
/// configuration is produced when one of them is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationMalformed {
    #[error(
        "server information missing: use either 'host' and 'port' or 'servers' option"
    )]
    MissingServerInfo,

    #[error(
        "'host' and 'servers' cannot be used together: pick either a single server or a multi server configuration"
    )]
    ConflictingServerInfo,

    #[error(
        "cannot accept single server settings (host, port) and multi server configuration (servers) at the same time"
    )]
    MixedServerModes,

    #[error("please specify more than one LDAP server using 'servers' to use HA")]
    HaRequiresServers,

    #[error(
        "when using multi-server, the option 'ssl_enabled' can't be used: use the ldaps:// scheme while listing the 'servers'"
    )]
    SslEnabledWithServers,

    #[error("'bind_dn' & 'bind_password' should be both present or both absent")]
    IncompleteBindCredentials,

    #[error("missing required field '{key}'")]
    MissingField { key: String },

    #[error("field '{key}' must be {expected}")]
    InvalidType { key: String, expected: &'static str },

    #[error("field '{key}' is {value}, expected {expected}")]
    OutOfRange {
        key: String,
        value: i64,
        expected: &'static str,
    },

    #[error("unknown HA mode '{token}', expected one of: {allowed}")]
    InvalidHa { token: String, allowed: String },
}

/// Failure while loading a whole settings document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse settings document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("directory settings #{index} are malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: ConfigurationMalformed,
    },

    #[error("directory name '{0}' is declared more than once")]
    DuplicateName(String),
}
