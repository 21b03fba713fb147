//! Validated settings for the directory (LDAP) servers used by
//! authentication and authorization rules.
//!
//! Settings are checked before any connection is attempted, so a
//! misconfiguration fails fast with the rule it breaks.
//!
//! ```
//! use ldap_settings::ldap::{DirectoryServerConfig, Ha, Named};
//! use ldap_settings::raw::RawSettings;
//!
//! let raw = RawSettings::from_yaml(
//!     "name: ldap2\nservers: ['ldaps://h1', 'ldaps://h2']\nha: ROUND_ROBIN\nsearch_user_base_DN: ou=People",
//! )
//! .unwrap();
//! let config = DirectoryServerConfig::from_settings(&raw).unwrap();
//!
//! assert_eq!(config.name(), "ldap2");
//! assert_eq!(config.ha(), Ha::RoundRobin);
//! ```

#![forbid(unsafe_code)]
#![deny(unused_mut)]

pub mod config;
pub mod error;
pub mod groups;
pub mod ldap;
pub mod raw;

pub use error::{ConfigError, ConfigurationMalformed};
pub use groups::AvailableGroups;
pub use ldap::{Cached, DirectoryServerConfig, Ha, Named, SearchingUser, ServerMode};
