//! Connection settings

use std::fmt;

/// Odoo server and credentials
#[derive(Clone, PartialEq, Eq)]
pub struct OdooConfig {
    /// Base URL, e.g. `https://erp.example.com`
    pub url: String,
    /// Database name
    pub database: String,
    /// Login of the API user
    pub username: String,
    /// API key or password
    pub api_key: String,
}

impl OdooConfig {
    /// Create configuration
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    /// JSON-RPC endpoint
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/jsonrpc", self.url.trim_end_matches('/'))
    }
}

impl fmt::Debug for OdooConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let config = OdooConfig::new("https://erp.example.com/", "prod", "bot", "secret");
        assert_eq!(config.endpoint(), "https://erp.example.com/jsonrpc");
    }

    #[test]
    fn debug_hides_key() {
        let config = OdooConfig::new("https://erp.example.com", "prod", "bot", "s3cr3t");
        let shown = format!("{config:?}");
        assert!(shown.contains("bot"));
        assert!(!shown.contains("s3cr3t"));
    }
}
