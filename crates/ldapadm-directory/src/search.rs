//! Subtree searches over an authenticated session.

use tracing::instrument;

use crate::dn::DistinguishedName;
use crate::model::{SearchQuery, SearchResultSet};
use crate::session::DirectorySession;
use crate::Result;

/// Filter used by the stock user count and listing actions.
pub const USER_FILTER: &str = "(objectClass=user)";

/// Issues search requests through a borrowed [`DirectorySession`].
///
/// Filters are passed through untouched; the server decides whether they are valid.
#[derive(Debug)]
pub struct SearchExecutor<'a> {
    session: &'a mut DirectorySession,
}

impl<'a> SearchExecutor<'a> {
    /// Wraps a session.
    pub fn new(session: &'a mut DirectorySession) -> Self {
        Self { session }
    }

    /// Counts the entries under `base_dn` matching `filter`.
    ///
    /// No attribute values are requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`](ldapadm_core::Error::NotAuthenticated) before a
    /// successful bind, or whatever the session reports for the search.
    #[instrument(skip(self), fields(base_dn = %base_dn))]
    pub async fn count(&mut self, base_dn: &DistinguishedName, filter: &str) -> Result<usize> {
        let query = SearchQuery::subtree(base_dn.as_str(), filter);
        Ok(self.session.send_search(&query).await?.len())
    }

    /// Lists the entries under `base_dn` matching `filter`, distinguished names only.
    ///
    /// # Errors
    ///
    /// Same as [`count`](Self::count).
    #[instrument(skip(self), fields(base_dn = %base_dn))]
    pub async fn list(
        &mut self,
        base_dn: &DistinguishedName,
        filter: &str,
    ) -> Result<SearchResultSet> {
        let query = SearchQuery::subtree(base_dn.as_str(), filter);
        self.session.send_search(&query).await
    }

    /// Runs an arbitrary query, including attribute projection.
    ///
    /// # Errors
    ///
    /// Same as [`count`](Self::count).
    pub async fn execute(&mut self, query: &SearchQuery) -> Result<SearchResultSet> {
        self.session.send_search(query).await
    }
}
