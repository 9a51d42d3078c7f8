//! Error types for directory operations.
//!
//! Failures fall into three tiers that callers must be able to tell apart: local precondition
//! or validation failures, transport failures, and rejections returned by the directory server.
//! [`Error::kind`] exposes the tier; [`Error::result_code`] exposes the native LDAP result code
//! carried by server rejections.

use std::fmt;
use thiserror::Error;

/// Main error type for directory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The domain string could not be mapped to a distinguished name.
    #[error("Invalid domain format: {0}")]
    InvalidDomainFormat(String),

    /// DNS resolution, connect, TLS handshake or timeout failure.
    #[error("Transport error: {cause}")]
    Transport {
        /// Human-readable description of the underlying failure
        cause: String,
    },

    /// The server rejected the bind request.
    #[error("Bind rejected: {code}: {server_message}")]
    Bind {
        /// Native LDAP result code
        code: ResultCode,
        /// Diagnostic text returned by the server (may be empty)
        server_message: String,
    },

    /// A search or modify was attempted before a successful bind.
    #[error("Session is not authenticated")]
    NotAuthenticated,

    /// The server rejected a search or modify request.
    #[error("Operation rejected: {code}: {server_message}")]
    Operation {
        /// Native LDAP result code
        code: ResultCode,
        /// Diagnostic text returned by the server (may be empty)
        server_message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Specialized result type for directory operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Detected locally before anything was sent.
    Local,
    /// The exchange with the server did not complete.
    Transport,
    /// The server answered with a non-success result code.
    Server,
}

impl Error {
    /// Creates a transport error from any displayable cause.
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self::Transport {
            cause: cause.to_string(),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDomainFormat(_) => "INVALID_DOMAIN_FORMAT",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Bind { .. } => "BIND_ERROR",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::Operation { .. } => "OPERATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Returns which tier the error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDomainFormat(_) | Self::NotAuthenticated | Self::Config(_) => {
                ErrorKind::Local
            }
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Bind { .. } | Self::Operation { .. } => ErrorKind::Server,
        }
    }

    /// Returns the LDAP result code for server rejections.
    #[must_use]
    pub const fn result_code(&self) -> Option<ResultCode> {
        match self {
            Self::Bind { code, .. } | Self::Operation { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the diagnostic text the server attached to a rejection, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Bind { server_message, .. } | Self::Operation { server_message, .. }
                if !server_message.is_empty() =>
            {
                Some(server_message)
            }
            _ => None,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Config(_))
    }
}

/// Native LDAP result code (RFC 4511 section 4.1.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultCode(u32);

impl ResultCode {
    /// `success`
    pub const SUCCESS: Self = Self(0);
    /// `operationsError`
    pub const OPERATIONS_ERROR: Self = Self(1);
    /// `protocolError`
    pub const PROTOCOL_ERROR: Self = Self(2);
    /// `unwillingToPerform`
    pub const UNWILLING_TO_PERFORM: Self = Self(53);
    /// `constraintViolation`, returned when a new password fails the directory's policy
    pub const CONSTRAINT_VIOLATION: Self = Self(19);
    /// `noSuchObject`
    pub const NO_SUCH_OBJECT: Self = Self(32);
    /// `invalidDNSyntax`
    pub const INVALID_DN_SYNTAX: Self = Self(34);
    /// `invalidCredentials`
    pub const INVALID_CREDENTIALS: Self = Self(49);
    /// `insufficientAccessRights`
    pub const INSUFFICIENT_ACCESS_RIGHTS: Self = Self(50);
    /// `filterError`, used for filters rejected by either side
    pub const FILTER_ERROR: Self = Self(87);

    /// Wraps a raw result code.
    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the RFC 4511 name of the code, if it is a well-known one.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "success",
            1 => "operationsError",
            2 => "protocolError",
            3 => "timeLimitExceeded",
            4 => "sizeLimitExceeded",
            7 => "authMethodNotSupported",
            8 => "strongerAuthRequired",
            10 => "referral",
            11 => "adminLimitExceeded",
            16 => "noSuchAttribute",
            17 => "undefinedAttributeType",
            19 => "constraintViolation",
            20 => "attributeOrValueExists",
            21 => "invalidAttributeSyntax",
            32 => "noSuchObject",
            34 => "invalidDNSyntax",
            48 => "inappropriateAuthentication",
            49 => "invalidCredentials",
            50 => "insufficientAccessRights",
            51 => "busy",
            52 => "unavailable",
            53 => "unwillingToPerform",
            65 => "objectClassViolation",
            80 => "other",
            87 => "filterError",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u32> for ResultCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({name})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

// Conversions from external error types
impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("invalid server address: {err}"))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(format!("Invalid session options: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::InvalidDomainFormat("a..b".to_string()).error_code(),
            "INVALID_DOMAIN_FORMAT"
        );
        assert_eq!(Error::transport("refused").error_code(), "TRANSPORT_ERROR");
        assert_eq!(
            Error::Bind {
                code: ResultCode::INVALID_CREDENTIALS,
                server_message: String::new()
            }
            .error_code(),
            "BIND_ERROR"
        );
        assert_eq!(Error::NotAuthenticated.error_code(), "NOT_AUTHENTICATED");
        assert_eq!(
            Error::Operation {
                code: ResultCode::CONSTRAINT_VIOLATION,
                server_message: String::new()
            }
            .error_code(),
            "OPERATION_ERROR"
        );
        assert_eq!(Error::Config("x".to_string()).error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_error_kinds_stay_distinct() {
        assert_eq!(Error::NotAuthenticated.kind(), ErrorKind::Local);
        assert_eq!(
            Error::InvalidDomainFormat(String::new()).kind(),
            ErrorKind::Local
        );
        assert_eq!(Error::transport("timeout").kind(), ErrorKind::Transport);
        assert_eq!(
            Error::Bind {
                code: ResultCode::INVALID_CREDENTIALS,
                server_message: String::new()
            }
            .kind(),
            ErrorKind::Server
        );
        assert_eq!(
            Error::Operation {
                code: ResultCode::NO_SUCH_OBJECT,
                server_message: String::new()
            }
            .kind(),
            ErrorKind::Server
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::Bind {
            code: ResultCode::INVALID_CREDENTIALS,
            server_message: "80090308: LdapErr: DSID-0C09044E".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Bind rejected: 49 (invalidCredentials): 80090308: LdapErr: DSID-0C09044E"
        );

        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_result_code_and_server_message() {
        let err = Error::Operation {
            code: ResultCode::new(19),
            server_message: "0000052D: Constraint violation".to_string(),
        };
        assert_eq!(err.result_code(), Some(ResultCode::CONSTRAINT_VIOLATION));
        assert_eq!(
            err.server_message(),
            Some("0000052D: Constraint violation")
        );

        let silent = Error::Operation {
            code: ResultCode::INSUFFICIENT_ACCESS_RIGHTS,
            server_message: String::new(),
        };
        assert!(silent.server_message().is_none());
        assert!(Error::NotAuthenticated.result_code().is_none());
    }

    #[test]
    fn test_result_code_names() {
        assert_eq!(ResultCode::new(49).name(), Some("invalidCredentials"));
        assert_eq!(ResultCode::FILTER_ERROR.name(), Some("filterError"));
        assert_eq!(ResultCode::new(4242).name(), None);
        assert_eq!(ResultCode::new(4242).to_string(), "4242");
        assert_eq!(ResultCode::from(50u32).value(), 50);
    }

    #[test]
    fn test_should_log() {
        assert!(Error::transport("tls").should_log());
        assert!(Error::Config("bad".to_string()).should_log());
        assert!(!Error::NotAuthenticated.should_log());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let converted: Error = err.into();
        assert!(matches!(converted, Error::Config(_)));
    }
}
