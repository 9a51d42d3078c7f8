//! LDAPS client primitives for ldapadm.
//!
//! This crate owns the protocol layer: mapping a domain to its search base, holding an
//! authenticated session, issuing subtree searches, and resetting passwords through the
//! `unicodePwd` attribute.
//!
//! ```no_run
//! use ldapadm_core::{Credentials, ServerEndpoint, SessionOptions};
//! use ldapadm_directory::{resolve, DirectorySession, SearchExecutor, USER_FILTER};
//!
//! # async fn run() -> ldapadm_directory::Result<()> {
//! let endpoint = ServerEndpoint::ldaps("ldap.example.com")?;
//! let mut session = DirectorySession::open(endpoint, SessionOptions::default())?;
//! session
//!     .bind(&Credentials::new("admin@ldap.example.com", "secret"))
//!     .await?;
//! let base = resolve("ldap.example.com")?;
//! let users = SearchExecutor::new(&mut session).list(&base, USER_FILTER).await;
//! session.close().await;
//! for dn in users?.distinguished_names() {
//!     println!("{dn}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

mod dn;
mod model;
mod password;
mod search;
mod session;
mod transport;

pub use dn::{resolve, DistinguishedName, RelativeDistinguishedName};
pub use model::{
    ModifyOperation, ModifyRequest, SearchEntry, SearchQuery, SearchResultSet, SearchScope,
    NO_ATTRIBUTES,
};
pub use password::{
    encode_unicode_pwd, password_modify_request, PasswordResetOperator, UNICODE_PWD_ATTRIBUTE,
};
pub use search::{SearchExecutor, USER_FILTER};
pub use session::{DirectorySession, SessionState};
pub use transport::{LdapConnector, LdapTransport, RealLdapConnector};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = ldapadm_core::Result<T>;
