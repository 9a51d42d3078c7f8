//! Bind credentials.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Principal and secret used for a simple bind.
///
/// The secret is wrapped in [`SecretString`] so it is zeroized on drop and never shows up in
/// `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    principal: String,
    secret: SecretString,
}

impl Credentials {
    /// Create new bind credentials.
    ///
    /// # Arguments
    ///
    /// * `principal` - Bind name: a DN, a UPN (`admin@corp.example.com`) or `DOMAIN\user`
    /// * `secret` - The bind password
    #[must_use]
    pub fn new(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Get the bind principal.
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Get the bind password.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("principal", &self.principal)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_accessors() {
        let creds = Credentials::new("CN=Administrator,CN=Users,DC=corp,DC=com", "P@ssw0rd");
        assert_eq!(
            creds.principal(),
            "CN=Administrator,CN=Users,DC=corp,DC=com"
        );
        assert_eq!(creds.secret(), "P@ssw0rd");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("admin@corp.example.com", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("admin@corp.example.com"));
        assert!(!rendered.contains("hunter2"));
    }
}
