//! Configuration structures for directory sessions.
//!
//! Every value here is built once by the caller (usually the command-line entry point) and passed
//! explicitly into the session. Nothing is read from files or the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Port used for LDAP over TLS.
pub const LDAPS_PORT: u16 = 636;

/// Default connection timeout (seconds).
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 10;
/// Default operation timeout (seconds).
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 30;

/// Transport security applied to the directory connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportSecurity {
    /// TLS from the first byte (LDAPS).
    Tls,
}

impl TransportSecurity {
    /// URL scheme matching this security mode.
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Tls => "ldaps",
        }
    }
}

/// Address of the directory server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    host: String,
    port: u16,
    transport_security: TransportSecurity,
}

impl ServerEndpoint {
    /// Creates an LDAPS endpoint on port 636 for the given host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host is empty or cannot form a valid LDAP URL.
    pub fn ldaps(host: impl Into<String>) -> Result<Self> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(Error::Config("server host cannot be empty".to_string()));
        }

        let endpoint = Self {
            host,
            port: LDAPS_PORT,
            transport_security: TransportSecurity::Tls,
        };

        let parsed = Url::parse(&endpoint.url())?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(Error::Config(format!(
                "`{}` is not a valid server host",
                endpoint.host
            )));
        }

        Ok(endpoint)
    }

    /// Host name or address of the server.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port of the server.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Transport security mode.
    #[must_use]
    pub const fn transport_security(&self) -> TransportSecurity {
        self.transport_security
    }

    /// Connection URL, e.g. `ldaps://dc01.corp.example.com:636`.
    ///
    /// IPv6 literals are bracketed: `ldaps://[::1]:636`.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = self.transport_security.scheme();
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{scheme}://[{}]:{}", self.host, self.port)
        } else {
            format!("{scheme}://{}:{}", self.host, self.port)
        }
    }
}

/// Tunables for a directory session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SessionOptions {
    /// Accept any certificate the server presents.
    ///
    /// This disables the TLS trust check entirely and is intended only for directories with
    /// self-signed certificates on trusted internal networks.
    #[serde(default)]
    pub insecure_skip_server_verify: bool,

    /// Optional path to an additional PEM CA certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,

    /// Connect and TLS handshake timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,

    /// Per-operation timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

const fn default_connection_timeout_secs() -> u64 {
    DEFAULT_CONNECTION_TIMEOUT_SECS
}

const fn default_operation_timeout_secs() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_SECS
}

impl SessionOptions {
    /// Creates options with certificate verification enabled and default timeouts.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            insecure_skip_server_verify: false,
            tls_ca_cert: None,
            connection_timeout_secs: DEFAULT_CONNECTION_TIMEOUT_SECS,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }

    /// Enables or disables the server certificate bypass.
    #[must_use]
    pub const fn with_insecure_skip_server_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_server_verify = skip;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Overrides the connection timeout in seconds.
    #[must_use]
    pub const fn with_connection_timeout_secs(mut self, seconds: u64) -> Self {
        self.connection_timeout_secs = seconds;
        self
    }

    /// Overrides the operation timeout in seconds.
    #[must_use]
    pub const fn with_operation_timeout_secs(mut self, seconds: u64) -> Self {
        self.operation_timeout_secs = seconds;
        self
    }

    /// Returns the connection timeout duration.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Returns the operation timeout duration.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Validates the options and returns them unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a timeout is out of range.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}
