//! Wire transport for directory sessions.
//!
//! [`LdapConnector`] and [`LdapTransport`] are the seam between session bookkeeping and the
//! network. The real implementation speaks LDAPS through `ldap3`; tests plug in mocks.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{LdapConnAsync, LdapConnSettings, LdapError, Mod};
use native_tls::{Certificate, TlsConnector};
use tokio::time::timeout;
use tracing::debug;

use ldapadm_core::config::{ServerEndpoint, SessionOptions};
use ldapadm_core::error::{Error, ResultCode};

use crate::model::{ModifyOperation, ModifyRequest, SearchEntry, SearchQuery};
use crate::Result;

/// One live connection to a directory server.
///
/// Implementations report server rejections as [`Error::Bind`] (from `simple_bind`) or
/// [`Error::Operation`] (from `search` and `modify`), and everything else as
/// [`Error::Transport`]. Dropping a transport releases the underlying connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LdapTransport: Send {
    /// Performs a simple bind.
    async fn simple_bind(&mut self, principal: &str, secret: &str) -> Result<()>;
    /// Runs a search and returns every entry the server sent.
    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<SearchEntry>>;
    /// Applies a modify request.
    async fn modify(&mut self, request: &ModifyRequest) -> Result<()>;
    /// Sends an unbind and shuts the connection down.
    async fn unbind(&mut self) -> Result<()>;
}

/// Factory for [`LdapTransport`] connections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LdapConnector: Send + Sync {
    /// Opens a TLS connection to `endpoint`.
    async fn connect(&self, endpoint: &ServerEndpoint) -> Result<Box<dyn LdapTransport>>;
}

/// Real LDAP connector backed by `ldap3`.
#[derive(Debug, Clone)]
pub struct RealLdapConnector {
    options: SessionOptions,
}

impl RealLdapConnector {
    /// Creates a new connector instance.
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl LdapConnector for RealLdapConnector {
    async fn connect(&self, endpoint: &ServerEndpoint) -> Result<Box<dyn LdapTransport>> {
        let settings = build_ldap_settings(&self.options)?;
        let url = endpoint.url();
        debug!(%url, "connecting to directory");
        let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(Error::transport)?;
        ldap3::drive!(conn);
        Ok(Box::new(RealLdapTransport {
            inner: ldap,
            operation_timeout: self.options.operation_timeout(),
        }))
    }
}

struct RealLdapTransport {
    inner: ldap3::Ldap,
    operation_timeout: Duration,
}

/// Which request produced an `ldap3` error; decides how a server rejection is reported.
#[derive(Debug, Clone, Copy)]
enum Exchange {
    Bind,
    Operation,
}

#[async_trait]
impl LdapTransport for RealLdapTransport {
    async fn simple_bind(&mut self, principal: &str, secret: &str) -> Result<()> {
        let result = timeout(self.operation_timeout, self.inner.simple_bind(principal, secret))
            .await
            .map_err(|_| Error::transport("bind timed out"))?
            .map_err(|err| map_ldap_error(err, Exchange::Bind))?;
        result
            .success()
            .map_err(|err| map_ldap_error(err, Exchange::Bind))?;
        Ok(())
    }

    async fn search(&mut self, query: &SearchQuery) -> Result<Vec<SearchEntry>> {
        let result = timeout(
            self.operation_timeout,
            self.inner.search(
                query.base_dn(),
                query.scope().into(),
                query.filter(),
                query.wire_attributes(),
            ),
        )
        .await
        .map_err(|_| Error::transport("search timed out"))?
        .map_err(|err| map_ldap_error(err, Exchange::Operation))?;
        let (entries, _) = result
            .success()
            .map_err(|err| map_ldap_error(err, Exchange::Operation))?;
        Ok(entries
            .into_iter()
            .filter(|entry| !entry.is_ref())
            .map(ldap3::SearchEntry::construct)
            .map(SearchEntry::from)
            .collect())
    }

    async fn modify(&mut self, request: &ModifyRequest) -> Result<()> {
        let attribute = request.attribute_name().as_bytes().to_vec();
        let values = HashSet::from([request.attribute_value().to_vec()]);
        let modification = match request.operation() {
            ModifyOperation::Replace => Mod::Replace(attribute, values),
        };

        let result = timeout(
            self.operation_timeout,
            self.inner.modify(request.target_dn(), vec![modification]),
        )
        .await
        .map_err(|_| Error::transport("modify timed out"))?
        .map_err(|err| map_ldap_error(err, Exchange::Operation))?;
        result
            .success()
            .map_err(|err| map_ldap_error(err, Exchange::Operation))?;
        Ok(())
    }

    async fn unbind(&mut self) -> Result<()> {
        timeout(self.operation_timeout, self.inner.unbind())
            .await
            .map_err(|_| Error::transport("unbind timed out"))?
            .map_err(Error::transport)?;
        Ok(())
    }
}

fn build_ldap_settings(options: &SessionOptions) -> Result<LdapConnSettings> {
    let settings = LdapConnSettings::new()
        .set_conn_timeout(options.connection_timeout())
        .set_no_tls_verify(options.insecure_skip_server_verify);
    Ok(match tls_connector(options)? {
        Some(connector) => settings.set_connector(connector),
        None => settings,
    })
}

/// Custom TLS connector, if the options need anything beyond the platform trust store.
fn tls_connector(options: &SessionOptions) -> Result<Option<TlsConnector>> {
    let mut builder = TlsConnector::builder();
    if options.insecure_skip_server_verify {
        builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    } else if let Some(path) = &options.tls_ca_cert {
        builder.add_root_certificate(read_ca_certificate(path)?);
    } else {
        return Ok(None);
    }
    builder
        .build()
        .map(Some)
        .map_err(|err| Error::Config(format!("cannot build TLS connector: {err}")))
}

fn read_ca_certificate(path: &Path) -> Result<Certificate> {
    let pem = fs::read(path)
        .map_err(|err| Error::Config(format!("cannot read {}: {err}", path.display())))?;
    Certificate::from_pem(&pem)
        .map_err(|err| Error::Config(format!("{} is not a PEM certificate: {err}", path.display())))
}

fn map_ldap_error(err: LdapError, exchange: Exchange) -> Error {
    match err {
        LdapError::LdapResult { result } => {
            let code = ResultCode::new(result.rc);
            let server_message = result.text;
            match exchange {
                Exchange::Bind => Error::Bind {
                    code,
                    server_message,
                },
                Exchange::Operation => Error::Operation {
                    code,
                    server_message,
                },
            }
        }
        LdapError::FilterParsing => Error::Operation {
            code: ResultCode::FILTER_ERROR,
            server_message: "filter could not be parsed".to_string(),
        },
        other => Error::transport(other),
    }
}
