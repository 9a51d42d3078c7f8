//! Request and result types exchanged with the directory.

use std::collections::HashMap;
use std::fmt;

use ldap3::Scope;

/// Attribute selector that asks the server to return no attributes at all (RFC 4511 4.5.1.8).
///
/// An empty attribute list means "all user attributes" on the wire, so a DN-only search has to
/// send this OID instead.
pub const NO_ATTRIBUTES: &str = "1.1";

/// Represents the search scope for LDAP queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Base object only.
    Base,
    /// One level below the base.
    OneLevel,
    /// Base object and every descendant.
    #[default]
    Subtree,
}

impl From<SearchScope> for Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        }
    }
}

/// A single search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    base_dn: String,
    filter: String,
    scope: SearchScope,
    attributes: Option<Vec<String>>,
}

impl SearchQuery {
    /// Creates a subtree search that returns distinguished names only.
    #[must_use]
    pub fn subtree(base_dn: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            filter: filter.into(),
            scope: SearchScope::Subtree,
            attributes: None,
        }
    }

    /// Requests the given attributes for every returned entry.
    #[must_use]
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides the search scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    /// Search base.
    #[must_use]
    pub fn base_dn(&self) -> &str {
        &self.base_dn
    }

    /// Filter string, passed to the server as-is.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Search scope.
    #[must_use]
    pub const fn scope(&self) -> SearchScope {
        self.scope
    }

    /// Requested attributes, `None` when only DNs are wanted.
    #[must_use]
    pub fn attributes(&self) -> Option<&[String]> {
        self.attributes.as_deref()
    }

    /// Attribute list to put on the wire.
    #[must_use]
    pub fn wire_attributes(&self) -> Vec<String> {
        match &self.attributes {
            Some(attributes) if !attributes.is_empty() => attributes.clone(),
            _ => vec![NO_ATTRIBUTES.to_string()],
        }
    }
}

/// LDAP entry returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchEntry {
    /// Distinguished name of the entry.
    pub dn: String,
    /// Attribute values as raw bytes (order preserved from server).
    pub attributes: HashMap<String, Vec<Vec<u8>>>,
}

impl SearchEntry {
    /// Creates an entry with no attributes.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    /// Returns all values for the attribute.
    #[must_use]
    pub fn values(&self, attribute: &str) -> Option<&[Vec<u8>]> {
        self.attributes
            .get(attribute)
            .map(|values| values.as_slice())
    }

    /// Returns the first value of the attribute decoded as UTF-8.
    #[must_use]
    pub fn first_str(&self, attribute: &str) -> Option<&str> {
        self.values(attribute)
            .and_then(<[Vec<u8>]>::first)
            .and_then(|value| std::str::from_utf8(value).ok())
    }
}

impl From<ldap3::SearchEntry> for SearchEntry {
    fn from(entry: ldap3::SearchEntry) -> Self {
        let mut attributes: HashMap<String, Vec<Vec<u8>>> = entry
            .attrs
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().map(String::into_bytes).collect()))
            .collect();
        for (name, values) in entry.bin_attrs {
            attributes.entry(name).or_default().extend(values);
        }

        Self {
            dn: entry.dn,
            attributes,
        }
    }
}

/// Entries produced by one search, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResultSet {
    entries: Vec<SearchEntry>,
}

impl SearchResultSet {
    /// Wraps a list of entries.
    #[must_use]
    pub fn new(entries: Vec<SearchEntry>) -> Self {
        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the search matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the entries.
    #[must_use]
    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, SearchEntry> {
        self.entries.iter()
    }

    /// Distinguished names of all entries, in order.
    pub fn distinguished_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.dn.as_str())
    }
}

impl IntoIterator for SearchResultSet {
    type Item = SearchEntry;
    type IntoIter = std::vec::IntoIter<SearchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchResultSet {
    type Item = &'a SearchEntry;
    type IntoIter = std::slice::Iter<'a, SearchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<Vec<SearchEntry>> for SearchResultSet {
    fn from(entries: Vec<SearchEntry>) -> Self {
        Self::new(entries)
    }
}

/// Modification applied by a [`ModifyRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOperation {
    /// Replace every existing value of the attribute.
    Replace,
}

/// Single-attribute modify request.
#[derive(Clone, PartialEq, Eq)]
pub struct ModifyRequest {
    target_dn: String,
    operation: ModifyOperation,
    attribute_name: String,
    attribute_value: Vec<u8>,
}

impl ModifyRequest {
    /// Creates a request replacing `attribute_name` on `target_dn` with a single value.
    #[must_use]
    pub fn replace(
        target_dn: impl Into<String>,
        attribute_name: impl Into<String>,
        attribute_value: Vec<u8>,
    ) -> Self {
        Self {
            target_dn: target_dn.into(),
            operation: ModifyOperation::Replace,
            attribute_name: attribute_name.into(),
            attribute_value,
        }
    }

    /// Object being modified.
    #[must_use]
    pub fn target_dn(&self) -> &str {
        &self.target_dn
    }

    /// Modification kind.
    #[must_use]
    pub const fn operation(&self) -> ModifyOperation {
        self.operation
    }

    /// Attribute being modified.
    #[must_use]
    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    /// Encoded attribute value.
    #[must_use]
    pub fn attribute_value(&self) -> &[u8] {
        &self.attribute_value
    }
}

// Values may carry encoded passwords, so only their size is printed.
impl fmt::Debug for ModifyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifyRequest")
            .field("target_dn", &self.target_dn)
            .field("operation", &self.operation)
            .field("attribute_name", &self.attribute_name)
            .field(
                "attribute_value",
                &format_args!("<{} bytes>", self.attribute_value.len()),
            )
            .finish()
    }
}
