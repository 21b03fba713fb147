//! LDAP server settings.
//!
//! A [`DirectoryServerConfig`] describes how to reach one logical directory
//! service, either a single host or a set of servers used in HA mode. It is
//! fully validated at construction and immutable afterwards.

mod connection;
mod credentials;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use credentials::SearchingUser;

use crate::error::{ConfigurationMalformed, Result};
use crate::raw::SettingsSource;

/// Settings key with the value used when the key is absent.
#[derive(Debug, Clone, Copy)]
pub struct Field<T> {
    pub key: &'static str,
    pub default: T,
}

const NAME: &str = "name";
const HOST: &str = "host";
const SERVERS: &str = "servers";
const SEARCH_USER_BASE_DN: &str = "search_user_base_DN";

pub const PORT: Field<u16> = Field {
    key: "port",
    default: 389,
};
pub const SSL_ENABLED: Field<bool> = Field {
    key: "ssl_enabled",
    default: true,
};
pub const TRUST_ALL_CERTS: Field<bool> = Field {
    key: "ssl_trust_all_certs",
    default: false,
};
pub const USER_ID_ATTRIBUTE: Field<&str> = Field {
    key: "user_id_attribute",
    default: "uid",
};
pub const CONNECTION_POOL_SIZE: Field<u32> = Field {
    key: "connection_pool_size",
    default: 30,
};
pub const CONNECTION_TIMEOUT: Field<Duration> = Field {
    key: "connection_timeout_in_sec",
    default: Duration::from_secs(1),
};
pub const REQUEST_TIMEOUT: Field<Duration> = Field {
    key: "request_timeout_in_sec",
    default: Duration::from_secs(1),
};
pub const CACHE_TTL: Field<Duration> = Field {
    key: "cache_ttl_in_sec",
    default: Duration::ZERO,
};
pub const HA_MODE: Field<Ha> = Field {
    key: "ha",
    default: Ha::Failover,
};

/// Settings that are referenced by name from access rules.
pub trait Named {
    fn name(&self) -> &str;
}

/// Settings whose lookups may be cached.
pub trait Cached {
    fn cache_ttl(&self) -> Duration;

    /// A zero TTL disables caching.
    fn is_cache_enabled(&self) -> bool {
        !self.cache_ttl().is_zero()
    }
}

/// Strategy used to pick a server when several are configured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ha {
    /// Try servers in order, move to the next one on failure.
    #[default]
    Failover,
    /// Spread requests across every server.
    RoundRobin,
}

impl Ha {
    pub const ALL: [Ha; 2] = [Ha::Failover, Ha::RoundRobin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ha::Failover => "FAILOVER",
            Ha::RoundRobin => "ROUND_ROBIN",
        }
    }
}

impl fmt::Display for Ha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ha {
    type Err = ConfigurationMalformed;

    fn from_str(token: &str) -> Result<Self> {
        Ha::ALL
            .into_iter()
            .find(|ha| ha.as_str() == token)
            .ok_or_else(|| ConfigurationMalformed::InvalidHa {
                token: token.to_owned(),
                allowed: Ha::ALL.map(|ha| ha.as_str()).join(", "),
            })
    }
}

/// Where the directory lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMode {
    /// One host, reached on the configured port.
    Single { host: String },
    /// Several server URIs. The URI scheme selects transport security.
    Multi { servers: BTreeSet<String> },
}

impl ServerMode {
    fn kind(&self) -> &'static str {
        match self {
            ServerMode::Single { .. } => "single",
            ServerMode::Multi { .. } => "multi",
        }
    }
}

/// Validated settings of one named directory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryServerConfig {
    name: String,
    mode: ServerMode,
    port: u16,
    ssl_enabled: bool,
    trust_all_certificates: bool,
    searching_user: Option<SearchingUser>,
    search_user_base_dn: String,
    user_id_attribute: String,
    connection_pool_size: u32,
    connection_timeout: Duration,
    request_timeout: Duration,
    cache_ttl: Duration,
    ha: Ha,
}

impl DirectoryServerConfig {
    /// Build and validate settings from a raw block.
    ///
    /// Checks run in a fixed order and the first failing one is returned:
    /// server information presence, single/multi server mixing with `ha`,
    /// `host` together with `servers`, `ssl_enabled` in multi server mode,
    /// then the bind pair, required fields, numeric ranges and the HA token.
    ///
    /// # Errors
    ///
    /// Returns `Err` with the violated rule. Nothing is built in that case.
    pub fn from_settings<S>(settings: &S) -> Result<Self>
    where
        S: SettingsSource + ?Sized,
    {
        let has_host = settings.contains(HOST);
        let has_ha = settings.contains(HA_MODE.key);
        let servers = settings.not_empty_list_opt(SERVERS)?;

        if !has_host && servers.is_none() {
            return Err(ConfigurationMalformed::MissingServerInfo);
        }
        if has_ha && (has_host || settings.contains(PORT.key)) {
            return Err(ConfigurationMalformed::MixedServerModes);
        }
        // Subsumed by the check above.
        if has_ha && has_host {
            return Err(ConfigurationMalformed::HaRequiresServers);
        }
        if has_host && servers.is_some() {
            return Err(ConfigurationMalformed::ConflictingServerInfo);
        }
        if settings.contains(SSL_ENABLED.key) && !has_host {
            return Err(ConfigurationMalformed::SslEnabledWithServers);
        }

        let name = settings.string_req(NAME)?;
        let mode = match settings.string_opt(HOST)? {
            Some(host) => ServerMode::Single { host },
            None => ServerMode::Multi {
                servers: servers.unwrap_or_default().into_iter().collect(),
            },
        };
        let port = int_field(settings, &PORT, 1, "a port between 1 and 65535")?;
        let ssl_enabled = settings
            .boolean_opt(SSL_ENABLED.key)?
            .unwrap_or(SSL_ENABLED.default);
        let trust_all_certificates = settings
            .boolean_opt(TRUST_ALL_CERTS.key)?
            .unwrap_or(TRUST_ALL_CERTS.default);
        let searching_user = SearchingUser::from_settings(settings)?;
        let search_user_base_dn = settings.string_req(SEARCH_USER_BASE_DN)?;
        let user_id_attribute = settings
            .string_opt(USER_ID_ATTRIBUTE.key)?
            .unwrap_or_else(|| USER_ID_ATTRIBUTE.default.to_owned());
        let connection_pool_size =
            int_field(settings, &CONNECTION_POOL_SIZE, 1, "a positive integer")?;
        let connection_timeout = seconds_field(settings, &CONNECTION_TIMEOUT)?;
        let request_timeout = seconds_field(settings, &REQUEST_TIMEOUT)?;
        let cache_ttl = seconds_field(settings, &CACHE_TTL)?;
        let ha = settings
            .string_opt(HA_MODE.key)?
            .map(|token| token.parse())
            .transpose()?
            .unwrap_or(HA_MODE.default);

        Ok(Self {
            name,
            mode,
            port,
            ssl_enabled,
            trust_all_certificates,
            searching_user,
            search_user_base_dn,
            user_id_attribute,
            connection_pool_size,
            connection_timeout,
            request_timeout,
            cache_ttl,
            ha,
        })
    }

    #[inline]
    pub fn mode(&self) -> &ServerMode {
        &self.mode
    }

    /// Host of a single server configuration.
    pub fn host(&self) -> Option<&str> {
        match &self.mode {
            ServerMode::Single { host } => Some(host),
            ServerMode::Multi { .. } => None,
        }
    }

    /// Server URIs of a multi server configuration.
    pub fn servers(&self) -> Option<&BTreeSet<String>> {
        match &self.mode {
            ServerMode::Single { .. } => None,
            ServerMode::Multi { servers } => Some(servers),
        }
    }

    /// Short label of the server mode, for logs.
    pub fn mode_kind(&self) -> &'static str {
        self.mode.kind()
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn is_ssl_enabled(&self) -> bool {
        self.ssl_enabled
    }

    #[inline]
    pub fn trust_all_certificates(&self) -> bool {
        self.trust_all_certificates
    }

    /// Bind identity, `None` for an anonymous bind.
    #[inline]
    pub fn searching_user(&self) -> Option<&SearchingUser> {
        self.searching_user.as_ref()
    }

    #[inline]
    pub fn search_user_base_dn(&self) -> &str {
        &self.search_user_base_dn
    }

    #[inline]
    pub fn user_id_attribute(&self) -> &str {
        &self.user_id_attribute
    }

    #[inline]
    pub fn connection_pool_size(&self) -> u32 {
        self.connection_pool_size
    }

    #[inline]
    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    #[inline]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    #[inline]
    pub fn ha(&self) -> Ha {
        self.ha
    }
}

impl Named for DirectoryServerConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Cached for DirectoryServerConfig {
    fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }
}

fn out_of_range(key: &str, value: i64, expected: &'static str) -> ConfigurationMalformed {
    ConfigurationMalformed::OutOfRange {
        key: key.into(),
        value,
        expected,
    }
}

fn int_field<S, T>(
    settings: &S,
    field: &Field<T>,
    min: i64,
    expected: &'static str,
) -> Result<T>
where
    S: SettingsSource + ?Sized,
    T: TryFrom<i64> + Copy,
{
    let Some(value) = settings.int_opt(field.key)? else {
        return Ok(field.default);
    };

    if value < min {
        return Err(out_of_range(field.key, value, expected));
    }
    T::try_from(value).map_err(|_| out_of_range(field.key, value, expected))
}

fn seconds_field<S>(settings: &S, field: &Field<Duration>) -> Result<Duration>
where
    S: SettingsSource + ?Sized,
{
    match settings.int_opt(field.key)? {
        None => Ok(field.default),
        Some(secs) => u64::try_from(secs)
            .map(Duration::from_secs)
            .map_err(|_| out_of_range(field.key, secs, "a non-negative number of seconds")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawSettings;

    fn build(yaml: &str) -> Result<DirectoryServerConfig> {
        DirectoryServerConfig::from_settings(&RawSettings::from_yaml(yaml).unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = build(
            r#"
            name: ldap1
            host: ldap.example.com
            search_user_base_DN: "ou=People,dc=example,dc=com"
            "#,
        )
        .unwrap();

        assert_eq!(config.name(), "ldap1");
        assert_eq!(config.host(), Some("ldap.example.com"));
        assert_eq!(config.servers(), None);
        assert_eq!(config.port(), 389);
        assert!(config.is_ssl_enabled());
        assert!(!config.trust_all_certificates());
        assert_eq!(config.searching_user(), None);
        assert_eq!(config.user_id_attribute(), "uid");
        assert_eq!(config.connection_pool_size(), 30);
        assert_eq!(config.connection_timeout(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        assert_eq!(config.cache_ttl(), Duration::ZERO);
        assert!(!config.is_cache_enabled());
        assert_eq!(config.ha(), Ha::Failover);
    }

    #[test]
    fn test_single_server_with_bind() {
        let config = build(
            r#"
            name: ldap1
            host: ldap.example.com
            ssl_enabled: false
            ssl_trust_all_certs: true
            bind_dn: "cn=admin,dc=example,dc=com"
            bind_password: password
            search_user_base_DN: "ou=People,dc=example,dc=com"
            connection_pool_size: 10
            cache_ttl_in_sec: 60
            "#,
        )
        .unwrap();

        assert!(!config.is_ssl_enabled());
        assert!(config.trust_all_certificates());
        assert_eq!(
            config.searching_user(),
            Some(&SearchingUser::new("cn=admin,dc=example,dc=com", "password"))
        );
        assert_eq!(config.connection_pool_size(), 10);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert!(config.is_cache_enabled());
        assert_eq!(config.ha(), Ha::Failover);
    }

    #[test]
    fn test_multi_server_round_robin() {
        let config = build(
            r#"
            name: ldap2
            servers: ["ldaps://h1", "ldaps://h2", "ldaps://h1"]
            ha: ROUND_ROBIN
            search_user_base_DN: "ou=People,dc=example,dc=com"
            "#,
        )
        .unwrap();

        let expected: BTreeSet<String> =
            ["ldaps://h1", "ldaps://h2"].map(String::from).into();
        assert_eq!(config.host(), None);
        assert_eq!(config.servers(), Some(&expected));
        assert_eq!(config.ha(), Ha::RoundRobin);
        assert_eq!(config.mode_kind(), "multi");
    }

    #[test]
    fn test_ha_with_host() {
        let err = build("name: ldap3\nhost: h\nha: FAILOVER\nsearch_user_base_DN: ou=x")
            .unwrap_err();
        assert_eq!(err, ConfigurationMalformed::MixedServerModes);

        let err = build(
            "name: ldap3\nhost: h\nport: 636\nha: FAILOVER\nsearch_user_base_DN: ou=x",
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationMalformed::MixedServerModes);
    }

    #[test]
    fn test_ha_with_port_in_multi_server() {
        let err = build(
            "name: x\nservers: ['ldaps://h1']\nport: 636\nha: FAILOVER\nsearch_user_base_DN: ou=x",
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationMalformed::MixedServerModes);
    }

    #[test]
    fn test_server_information() {
        let err = build("name: x\nsearch_user_base_DN: ou=x").unwrap_err();
        assert_eq!(err, ConfigurationMalformed::MissingServerInfo);

        let err = build("name: x\nservers: []\nsearch_user_base_DN: ou=x").unwrap_err();
        assert_eq!(err, ConfigurationMalformed::MissingServerInfo);

        let err = build("name: x\nhost: h\nservers: ['ldaps://h1']\nsearch_user_base_DN: ou=x")
            .unwrap_err();
        assert_eq!(err, ConfigurationMalformed::ConflictingServerInfo);
    }

    #[test]
    fn test_ssl_enabled_with_servers() {
        let err = build(
            "name: x\nservers: ['ldaps://h1', 'ldaps://h2']\nssl_enabled: true\nsearch_user_base_DN: ou=x",
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationMalformed::SslEnabledWithServers);

        // Presence alone is enough, even with a mistyped value.
        let err = build(
            "name: x\nservers: ['ldaps://h1']\nssl_enabled: nope\nsearch_user_base_DN: ou=x",
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationMalformed::SslEnabledWithServers);
    }

    #[test]
    fn test_incomplete_bind_pair() {
        let err = build("name: x\nhost: h\nbind_dn: cn=admin\nsearch_user_base_DN: ou=x")
            .unwrap_err();
        assert_eq!(err, ConfigurationMalformed::IncompleteBindCredentials);

        let err = build("name: x\nhost: h\nbind_password: pw\nsearch_user_base_DN: ou=x")
            .unwrap_err();
        assert_eq!(err, ConfigurationMalformed::IncompleteBindCredentials);
    }

    #[test]
    fn test_required_fields() {
        let err = build("host: h\nsearch_user_base_DN: ou=x").unwrap_err();
        assert!(matches!(err, ConfigurationMalformed::MissingField { key } if key == "name"));

        let err = build("name: x\nhost: h").unwrap_err();
        assert!(
            matches!(err, ConfigurationMalformed::MissingField { key } if key == "search_user_base_DN")
        );
    }

    #[test]
    fn test_invalid_ha_token() {
        let err = build("name: x\nservers: ['ldaps://h1']\nha: ROUNDR_ROBIN\nsearch_user_base_DN: ou=x")
            .unwrap_err();

        assert_eq!(
            err,
            ConfigurationMalformed::InvalidHa {
                token: "ROUNDR_ROBIN".into(),
                allowed: "FAILOVER, ROUND_ROBIN".into(),
            }
        );
    }

    #[test]
    fn test_numeric_ranges() {
        let base = "name: x\nhost: h\nsearch_user_base_DN: ou=x\n";

        for extra in [
            "port: 0",
            "port: 70000",
            "connection_pool_size: 0",
            "connection_pool_size: -3",
            "connection_timeout_in_sec: -1",
            "request_timeout_in_sec: -1",
            "cache_ttl_in_sec: -60",
        ] {
            let err = build(&format!("{base}{extra}")).unwrap_err();
            assert!(
                matches!(err, ConfigurationMalformed::OutOfRange { .. }),
                "{extra} should be out of range"
            );
        }

        let config = build(&format!(
            "{base}port: 636\nconnection_timeout_in_sec: 0\nrequest_timeout_in_sec: 5"
        ))
        .unwrap();
        assert_eq!(config.port(), 636);
        assert_eq!(config.connection_timeout(), Duration::ZERO);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_same_input_same_value() {
        let yaml = "name: x\nservers: ['ldaps://h2', 'ldaps://h1']\nsearch_user_base_DN: ou=x";
        assert_eq!(build(yaml).unwrap(), build(yaml).unwrap());
    }

    #[test]
    fn test_ha_parsing() {
        assert_eq!("FAILOVER".parse::<Ha>().unwrap(), Ha::Failover);
        assert_eq!("ROUND_ROBIN".parse::<Ha>().unwrap(), Ha::RoundRobin);
        assert!("round_robin".parse::<Ha>().is_err());
        assert_eq!(Ha::RoundRobin.to_string(), "ROUND_ROBIN");
    }
}
