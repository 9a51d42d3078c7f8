//! Authenticated directory session.
//!
//! A [`DirectorySession`] starts [`SessionState::Unauthenticated`], becomes
//! [`SessionState::Authenticated`] after the first successful bind, and ends
//! [`SessionState::Closed`]. Search and modify requests are refused locally until the bind has
//! succeeded. The session owns its connection exclusively; run one session per concurrent caller.

use tracing::{debug, info, instrument, warn};

use ldapadm_core::config::{ServerEndpoint, SessionOptions};
use ldapadm_core::credentials::Credentials;
use ldapadm_core::error::{Error, ErrorKind};

use crate::model::{ModifyRequest, SearchQuery, SearchResultSet};
use crate::transport::{LdapConnector, LdapTransport, RealLdapConnector};
use crate::Result;

/// Lifecycle state of a [`DirectorySession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No successful bind yet.
    Unauthenticated,
    /// Bound; search and modify are allowed.
    Authenticated,
    /// Connection released; the session cannot be used again.
    Closed,
}

/// Exclusive, stateful connection to one directory server.
pub struct DirectorySession {
    endpoint: ServerEndpoint,
    connector: Box<dyn LdapConnector>,
    transport: Option<Box<dyn LdapTransport>>,
    state: SessionState,
}

impl DirectorySession {
    /// Prepares a session to `endpoint` using the real LDAPS transport.
    ///
    /// Nothing is sent until [`bind`](Self::bind) is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options fail validation.
    pub fn open(endpoint: ServerEndpoint, options: SessionOptions) -> Result<Self> {
        let options = options.validated()?;
        if options.insecure_skip_server_verify {
            warn!(
                host = endpoint.host(),
                "server certificate verification is disabled for this session"
            );
        }
        Ok(Self::with_connector(
            endpoint,
            Box::new(RealLdapConnector::new(options)),
        ))
    }

    /// Prepares a session that connects through a custom connector.
    #[must_use]
    pub fn with_connector(endpoint: ServerEndpoint, connector: Box<dyn LdapConnector>) -> Self {
        Self {
            endpoint,
            connector,
            transport: None,
            state: SessionState::Unauthenticated,
        }
    }

    /// Server this session talks to.
    #[must_use]
    pub fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true once a bind has succeeded and the session is still open.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Connects over TLS (if not already connected) and performs a simple bind.
    ///
    /// Binding an already authenticated session is a no-op.
    ///
    /// # Errors
    ///
    /// - [`Error::Bind`] if the server rejects the credentials; the session stays
    ///   unauthenticated and keeps its connection for a further attempt.
    /// - [`Error::Transport`] if the connection could not be established or broke; the
    ///   connection is dropped and the session stays unauthenticated.
    /// - [`Error::Transport`] if the session was already closed.
    #[instrument(skip(self, credentials), fields(host = %self.endpoint.host(), principal = credentials.principal()))]
    pub async fn bind(&mut self, credentials: &Credentials) -> Result<()> {
        match self.state {
            SessionState::Closed => return Err(Error::transport("session is closed")),
            SessionState::Authenticated => {
                debug!("session already bound");
                return Ok(());
            }
            SessionState::Unauthenticated => {}
        }

        if self.transport.is_none() {
            let transport = self.connector.connect(&self.endpoint).await?;
            self.transport = Some(transport);
        }
        let Some(transport) = self.transport.as_mut() else {
            return Err(Error::transport("no connection available"));
        };

        match transport
            .simple_bind(credentials.principal(), credentials.secret())
            .await
        {
            Ok(()) => {
                self.state = SessionState::Authenticated;
                info!("bound to directory");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "bind failed");
                if err.kind() == ErrorKind::Transport {
                    self.discard_transport();
                }
                Err(err)
            }
        }
    }

    /// Releases the connection. Safe to call any number of times.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(err) = transport.unbind().await {
                warn!(error = %err, "unbind failed while closing session");
            }
            debug!(host = self.endpoint.host(), "directory session closed");
        }
        self.state = SessionState::Closed;
    }

    pub(crate) async fn send_search(&mut self, query: &SearchQuery) -> Result<SearchResultSet> {
        let transport = self.authenticated_transport()?;
        debug!(
            base = query.base_dn(),
            filter = query.filter(),
            scope = ?query.scope(),
            "issuing search"
        );
        let result = transport.search(query).await;
        let entries = self.settle(result)?;
        debug!(count = entries.len(), "search complete");
        Ok(SearchResultSet::new(entries))
    }

    pub(crate) async fn send_modify(&mut self, request: &ModifyRequest) -> Result<()> {
        let transport = self.authenticated_transport()?;
        debug!(
            target = request.target_dn(),
            attribute = request.attribute_name(),
            "issuing modify"
        );
        let result = transport.modify(request).await;
        self.settle(result)
    }

    fn authenticated_transport(&mut self) -> Result<&mut Box<dyn LdapTransport>> {
        if self.state != SessionState::Authenticated {
            return Err(Error::NotAuthenticated);
        }
        self.transport.as_mut().ok_or(Error::NotAuthenticated)
    }

    // A transport failure leaves the connection in an unknown state, so it is not reused.
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.kind() == ErrorKind::Transport {
                warn!(error = %err, "transport failure, dropping connection");
                self.discard_transport();
                self.state = SessionState::Unauthenticated;
            }
        }
        result
    }

    fn discard_transport(&mut self) {
        drop(self.transport.take());
    }
}

impl Drop for DirectorySession {
    fn drop(&mut self) {
        if self.transport.take().is_some() {
            debug!(
                host = self.endpoint.host(),
                "session dropped without close, connection released"
            );
        }
    }
}

impl std::fmt::Debug for DirectorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySession")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .field("connected", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchEntry;
    use crate::transport::{MockLdapConnector, MockLdapTransport};
    use ldapadm_core::error::ResultCode;

    fn endpoint() -> ServerEndpoint {
        ServerEndpoint::ldaps("ldap.example.com").unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("admin@example.com", "secret")
    }

    fn connector_with(transport: MockLdapTransport) -> MockLdapConnector {
        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .times(1)
            .return_once(move |_| Ok(Box::new(transport)));
        connector
    }

    fn bind_rejected() -> Error {
        Error::Bind {
            code: ResultCode::INVALID_CREDENTIALS,
            server_message: "data 52e".to_string(),
        }
    }

    #[test]
    fn open_starts_unauthenticated() {
        let session = DirectorySession::open(endpoint(), SessionOptions::default()).unwrap();
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(!session.is_authenticated());
        assert_eq!(session.endpoint().port(), 636);
    }

    #[test]
    fn open_rejects_invalid_options() {
        let options = SessionOptions::default().with_connection_timeout_secs(0);
        let err = DirectorySession::open(endpoint(), options).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn bind_success_authenticates() {
        let mut transport = MockLdapTransport::new();
        transport
            .expect_simple_bind()
            .withf(|principal, secret| principal == "admin@example.com" && secret == "secret")
            .times(1)
            .returning(|_, _| Ok(()));
        transport.expect_unbind().times(1).returning(|| Ok(()));

        let mut session =
            DirectorySession::with_connector(endpoint(), Box::new(connector_with(transport)));
        session.bind(&credentials()).await.unwrap();
        assert!(session.is_authenticated());

        // second bind is a no-op and does not reconnect
        session.bind(&credentials()).await.unwrap();
        session.close().await;
    }

    #[tokio::test]
    async fn search_before_bind_is_not_authenticated() {
        let mut connector = MockLdapConnector::new();
        connector.expect_connect().never();
        let mut session = DirectorySession::with_connector(endpoint(), Box::new(connector));

        let query = SearchQuery::subtree("dc=example,dc=com", "(objectClass=user)");
        let err = session.send_search(&query).await.unwrap_err();
        assert_eq!(err, Error::NotAuthenticated);

        let request = ModifyRequest::replace("CN=Test,DC=example,DC=com", "unicodePwd", vec![]);
        let err = session.send_modify(&request).await.unwrap_err();
        assert_eq!(err, Error::NotAuthenticated);
    }

    #[tokio::test]
    async fn rejected_bind_leaves_session_unauthenticated() {
        let mut transport = MockLdapTransport::new();
        transport
            .expect_simple_bind()
            .returning(|_, _| Err(bind_rejected()));
        transport.expect_search().never();
        transport.expect_unbind().times(1).returning(|| Ok(()));

        let mut session =
            DirectorySession::with_connector(endpoint(), Box::new(connector_with(transport)));
        let err = session.bind(&credentials()).await.unwrap_err();
        assert!(matches!(err, Error::Bind { .. }));
        assert_eq!(session.state(), SessionState::Unauthenticated);

        let query = SearchQuery::subtree("dc=example,dc=com", "(objectClass=user)");
        assert_eq!(
            session.send_search(&query).await.unwrap_err(),
            Error::NotAuthenticated
        );
        session.close().await;
    }

    #[tokio::test]
    async fn connect_failure_is_transport_error() {
        let mut connector = MockLdapConnector::new();
        connector
            .expect_connect()
            .times(1)
            .returning(|_| Err(Error::transport("connection refused")));

        let mut session = DirectorySession::with_connector(endpoint(), Box::new(connector));
        let err = session.bind(&credentials()).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert_eq!(session.state(), SessionState::Unauthenticated);
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn transport_failure_during_bind_drops_connection() {
        let mut transport = MockLdapTransport::new();
        transport
            .expect_simple_bind()
            .returning(|_, _| Err(Error::transport("tls handshake failed")));
        transport.expect_unbind().never();

        let mut session =
            DirectorySession::with_connector(endpoint(), Box::new(connector_with(transport)));
        assert!(session.bind(&credentials()).await.is_err());
        assert_eq!(session.state(), SessionState::Unauthenticated);
        session.close().await;
    }

    #[tokio::test]
    async fn transport_failure_during_search_resets_state() {
        let mut transport = MockLdapTransport::new();
        transport.expect_simple_bind().returning(|_, _| Ok(()));
        transport
            .expect_search()
            .times(1)
            .returning(|_| Err(Error::transport("connection reset")));
        transport.expect_unbind().never();

        let mut session =
            DirectorySession::with_connector(endpoint(), Box::new(connector_with(transport)));
        session.bind(&credentials()).await.unwrap();

        let query = SearchQuery::subtree("dc=example,dc=com", "(objectClass=user)");
        let err = session.send_search(&query).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert_eq!(
            session.send_search(&query).await.unwrap_err(),
            Error::NotAuthenticated
        );
    }

    #[tokio::test]
    async fn operation_error_keeps_session_usable() {
        let mut transport = MockLdapTransport::new();
        transport.expect_simple_bind().returning(|_, _| Ok(()));
        let mut calls = 0;
        transport.expect_search().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(Error::Operation {
                    code: ResultCode::FILTER_ERROR,
                    server_message: "bad filter".to_string(),
                })
            } else {
                Ok(vec![SearchEntry::new("CN=A,DC=example,DC=com")])
            }
        });
        transport.expect_unbind().times(1).returning(|| Ok(()));

        let mut session =
            DirectorySession::with_connector(endpoint(), Box::new(connector_with(transport)));
        session.bind(&credentials()).await.unwrap();

        let bad = SearchQuery::subtree("dc=example,dc=com", "objectClass=user(");
        assert!(matches!(
            session.send_search(&bad).await,
            Err(Error::Operation { .. })
        ));
        assert!(session.is_authenticated());

        let good = SearchQuery::subtree("dc=example,dc=com", "(objectClass=user)");
        assert_eq!(session.send_search(&good).await.unwrap().len(), 1);
        session.close().await;
    }

    #[tokio::test]
    async fn close_twice_releases_once() {
        let mut transport = MockLdapTransport::new();
        transport.expect_simple_bind().returning(|_, _| Ok(()));
        transport.expect_unbind().times(1).returning(|| Ok(()));

        let mut session =
            DirectorySession::with_connector(endpoint(), Box::new(connector_with(transport)));
        session.bind(&credentials()).await.unwrap();
        session.close().await;
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);

        let err = session.bind(&credentials()).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn close_swallows_unbind_failure() {
        let mut transport = MockLdapTransport::new();
        transport.expect_simple_bind().returning(|_, _| Ok(()));
        transport
            .expect_unbind()
            .times(1)
            .returning(|| Err(Error::transport("broken pipe")));

        let mut session =
            DirectorySession::with_connector(endpoint(), Box::new(connector_with(transport)));
        session.bind(&credentials()).await.unwrap();
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn close_without_connection_is_noop() {
        let mut connector = MockLdapConnector::new();
        connector.expect_connect().never();
        let mut session = DirectorySession::with_connector(endpoint(), Box::new(connector));
        session.close().await;
        session.close().await;
        assert_eq!(session.state(), SessionState::Closed);
    }
}
