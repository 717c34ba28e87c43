//! HTTP Server Configuration
//!
//! Configuration for the HTTP server including host, port and CORS
//! settings, plus the mode under which CSV uploads are admitted.

use serde::{Deserialize, Serialize};

/// How rows from an uploaded CSV are admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Every row runs through the record validator
    #[default]
    Validated,
    /// Rows only need to convert into typed records; business rules and
    /// sign checks are skipped
    Trusted,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins (default: ["http://localhost:4200"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Whether cross-origin requests may carry credentials (default: true)
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:4200".to_string()] // Angular dev server
}

fn default_allow_credentials() -> bool {
    true
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

impl HttpServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
