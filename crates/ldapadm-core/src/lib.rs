//! # ldapadm-core
//!
//! Core types shared by the ldapadm directory client.
//!
//! This crate holds the pieces that carry no protocol logic of their own: the error taxonomy,
//! the LDAP result-code catalogue, and the configuration values threaded into a directory session.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and LDAP result code mapping
//! - [`config`] - Server endpoint and session options
//! - [`credentials`] - Bind credentials with a protected secret

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod credentials;
pub mod error;

// Re-export commonly used types
pub use config::{ServerEndpoint, SessionOptions, TransportSecurity, LDAPS_PORT};
pub use credentials::Credentials;
pub use error::{Error, ErrorKind, Result, ResultCode};
