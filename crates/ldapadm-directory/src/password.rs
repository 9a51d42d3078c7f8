//! Password resets through the `unicodePwd` attribute.
//!
//! Active Directory only accepts a new password as the UTF-16LE encoding of the password
//! surrounded by literal double quotes, sent as a single-value replace over an encrypted
//! connection. Any other byte layout is rejected with `constraintViolation`.

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use crate::model::ModifyRequest;
use crate::session::DirectorySession;
use crate::Result;

/// Attribute that carries the password on Active-Directory-style schemas.
pub const UNICODE_PWD_ATTRIBUTE: &str = "unicodePwd";

/// Encodes a plaintext password as `"<password>"` in UTF-16LE.
#[must_use]
pub fn encode_unicode_pwd(password: &str) -> Vec<u8> {
    format!("\"{password}\"")
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// Builds the replace request that sets `target_dn`'s password.
#[must_use]
pub fn password_modify_request(target_dn: &str, new_secret: &SecretString) -> ModifyRequest {
    ModifyRequest::replace(
        target_dn,
        UNICODE_PWD_ATTRIBUTE,
        encode_unicode_pwd(new_secret.expose_secret()),
    )
}

/// Resets user passwords through a borrowed [`DirectorySession`].
///
/// The secret is supplied by the caller; nothing here generates or retries passwords.
#[derive(Debug)]
pub struct PasswordResetOperator<'a> {
    session: &'a mut DirectorySession,
}

impl<'a> PasswordResetOperator<'a> {
    /// Wraps a session.
    pub fn new(session: &'a mut DirectorySession) -> Self {
        Self { session }
    }

    /// Replaces the password of the object at `target_dn`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`](ldapadm_core::Error::NotAuthenticated) before a
    /// successful bind. Server rejections come back unchanged as
    /// [`Error::Operation`](ldapadm_core::Error::Operation), typically `constraintViolation` when
    /// the password fails policy or `insufficientAccessRights` when the bound principal may not
    /// modify the target.
    #[instrument(skip(self, new_secret))]
    pub async fn reset_password(&mut self, target_dn: &str, new_secret: &SecretString) -> Result<()> {
        let request = password_modify_request(target_dn, new_secret);
        self.session.send_modify(&request).await?;
        info!("password replaced");
        Ok(())
    }
}
