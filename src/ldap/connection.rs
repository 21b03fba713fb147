//! What an LDAP client needs from validated settings.
//!
//! Nothing here opens a connection.

use ldap3::LdapConnSettings;

use super::{DirectoryServerConfig, ServerMode};

impl DirectoryServerConfig {
    /// LDAP URLs to connect to, in a stable order.
    ///
    /// A single host is turned into `ldaps://host:port` or `ldap://host:port`
    /// depending on `ssl_enabled`. Multi server entries are returned as
    /// written, their scheme is left to the client.
    pub fn urls(&self) -> Vec<String> {
        match self.mode() {
            ServerMode::Single { host } => {
                let scheme = if self.is_ssl_enabled() { "ldaps" } else { "ldap" };
                vec![format!("{scheme}://{host}:{}", self.port())]
            },
            ServerMode::Multi { servers } => servers.iter().cloned().collect(),
        }
    }

    /// Create [`LdapConnSettings`] for every connection of the pool.
    pub fn conn_settings(&self) -> LdapConnSettings {
        LdapConnSettings::new()
            .set_conn_timeout(self.connection_timeout())
            .set_no_tls_verify(self.trust_all_certificates())
    }

    /// Search filter matching a user by identifier.
    pub fn user_filter(&self, uid: &str) -> String {
        format!("({}={})", self.user_id_attribute(), escape_ldap(uid))
    }
}

fn escape_ldap(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '*' => out.push_str(r"\2a"),
            '(' => out.push_str(r"\28"),
            ')' => out.push_str(r"\29"),
            '\\' => out.push_str(r"\5c"),
            '\0' => out.push_str(r"\00"),
            c => out.push(c),
        }
    }
    out
}
