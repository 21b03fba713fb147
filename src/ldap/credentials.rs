//! Bind identity used to search the directory.

use std::fmt;

use crate::error::{ConfigurationMalformed, Result};
use crate::raw::SettingsSource;

const BIND_DN: &str = "bind_dn";
const BIND_PASSWORD: &str = "bind_password";

/// Distinguished name and password used to bind before searching.
///
/// Both parts are always set together; a block with only one of them is
/// rejected.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchingUser {
    dn: String,
    password: String,
}

impl SearchingUser {
    /// Create a new [`SearchingUser`].
    pub fn new(dn: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            password: password.into(),
        }
    }

    /// Resolve the bind identity of a settings block.
    ///
    /// Returns `Ok(None)` for an anonymous bind.
    ///
    /// # Errors
    ///
    /// Returns `Err` if exactly one of `bind_dn` and `bind_password` is set.
    pub fn from_settings<S>(settings: &S) -> Result<Option<Self>>
    where
        S: SettingsSource + ?Sized,
    {
        let dn = settings.string_opt(BIND_DN)?;
        let password = settings.string_opt(BIND_PASSWORD)?;

        match (dn, password) {
            (Some(dn), Some(password)) => Ok(Some(Self { dn, password })),
            (None, None) => Ok(None),
            _ => Err(ConfigurationMalformed::IncompleteBindCredentials),
        }
    }

    #[inline]
    pub fn dn(&self) -> &str {
        &self.dn
    }

    #[inline]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for SearchingUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchingUser")
            .field("dn", &self.dn)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawSettings;

    fn resolve(yaml: &str) -> Result<Option<SearchingUser>> {
        SearchingUser::from_settings(&RawSettings::from_yaml(yaml).unwrap())
    }

    #[test]
    fn test_both_or_nothing() {
        assert_eq!(resolve("name: x").unwrap(), None);

        let user = resolve("bind_dn: cn=admin,dc=example,dc=com\nbind_password: secret")
            .unwrap()
            .unwrap();
        assert_eq!(user.dn(), "cn=admin,dc=example,dc=com");
        assert_eq!(user.password(), "secret");
    }

    #[test]
    fn test_half_pair_is_rejected() {
        assert_eq!(
            resolve("bind_dn: cn=admin").unwrap_err(),
            ConfigurationMalformed::IncompleteBindCredentials
        );
        assert_eq!(
            resolve("bind_password: secret").unwrap_err(),
            ConfigurationMalformed::IncompleteBindCredentials
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let user = SearchingUser::new("cn=admin", "hunter2");
        let debug = format!("{user:?}");

        assert!(debug.contains("cn=admin"));
        assert!(!debug.contains("hunter2"));
    }
}
