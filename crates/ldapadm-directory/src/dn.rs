//! Distinguished Name utilities.
//!
//! A search base is derived from the DNS name of the domain: every dot-separated label becomes a
//! `dc=` component, most specific first. Labels are copied verbatim; no case folding or DN escaping
//! is applied, so callers must supply a domain made of valid label characters.

use std::fmt;

use ldapadm_core::error::Error;

use crate::Result;

/// Attribute used for every component of a domain-derived DN.
const DOMAIN_COMPONENT: &str = "dc";

/// Relative distinguished name (single attribute/value pair).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeDistinguishedName {
    attribute: String,
    value: String,
}

impl RelativeDistinguishedName {
    /// Create a new relative distinguished name.
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Attribute portion of the RDN (e.g. `dc`).
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Attribute value portion of the RDN.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for RelativeDistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// Distinguished name derived from a DNS domain.
///
/// Keeps the rendered string alongside its components so it can be handed to the wire layer
/// without re-joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishedName {
    raw: String,
    rdns: Vec<RelativeDistinguishedName>,
}

impl DistinguishedName {
    /// Maps a dot-separated domain to its `dc=` distinguished name.
    ///
    /// `corp.example.com` becomes `dc=corp,dc=example,dc=com`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDomainFormat`] if the domain is empty or contains an empty label
    /// (leading, trailing or doubled dots).
    pub fn from_domain(domain: &str) -> Result<Self> {
        if domain.is_empty() {
            return Err(Error::InvalidDomainFormat(
                "domain cannot be empty".to_string(),
            ));
        }

        let rdns = domain
            .split('.')
            .map(|label| {
                if label.is_empty() {
                    Err(Error::InvalidDomainFormat(format!(
                        "`{domain}` contains an empty label"
                    )))
                } else {
                    Ok(RelativeDistinguishedName::new(DOMAIN_COMPONENT, label))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: rdns_to_string(&rdns),
            rdns,
        })
    }

    /// Borrows the distinguished name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the relative distinguished names in order.
    #[must_use]
    pub fn rdns(&self) -> &[RelativeDistinguishedName] {
        &self.rdns
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    /// Always false for a successfully resolved name; provided for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }
}

/// Resolves a DNS domain to its `dc=` distinguished name.
///
/// # Errors
///
/// See [`DistinguishedName::from_domain`].
pub fn resolve(domain: &str) -> Result<DistinguishedName> {
    DistinguishedName::from_domain(domain)
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for DistinguishedName {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl From<DistinguishedName> for String {
    fn from(value: DistinguishedName) -> Self {
        value.raw
    }
}

fn rdns_to_string(rdns: &[RelativeDistinguishedName]) -> String {
    rdns.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
