use crate::error::{CoreError, Result};
use crate::extract::extract_domain;
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt::Display;

/// A registrable domain name, e.g. `example.co.uk`.
///
/// Domains are stored lowercase and are never empty. Ordering is plain
/// lexicographic order of the name, which is also the tie-break order of
/// range queries.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

const MAX_LENGTH: usize = 253;

impl Domain {
    /// Creates a new `Domain` after validating the input.
    ///
    /// The name is lowercased. Valid names are 1-253 characters of
    /// `[a-z0-9._-]` and may not start or end with a dot.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into().to_ascii_lowercase();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Creates a `Domain` without validation.
    ///
    /// Use this only for names read back from a trusted store.
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the domain as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(CoreError::InvalidDomain("domain cannot be empty".to_string()));
        }

        if name.len() > MAX_LENGTH {
            return Err(CoreError::InvalidDomain(format!(
                "length must be at most {MAX_LENGTH}, got {}",
                name.len()
            )));
        }

        if name.starts_with('.') || name.ends_with('.') {
            return Err(CoreError::InvalidDomain(format!(
                "leading or trailing dot in '{name}'"
            )));
        }

        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
        {
            return Err(CoreError::InvalidDomain(format!(
                "unexpected character '{c}' in '{name}'"
            )));
        }

        Ok(())
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Domain {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Domain> for String {
    fn from(value: Domain) -> Self {
        value.0
    }
}

/// A deduplicated set of domains written together with one timestamp.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainBatch {
    domains: BTreeSet<Domain>,
}

impl DomainBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a batch from submitted links.
    ///
    /// Each link is reduced to its registrable domain. Links without one
    /// are dropped and repeated domains collapse to a single member.
    pub fn from_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        links
            .into_iter()
            .filter_map(|link| extract_domain(link.as_ref()))
            .collect()
    }

    /// Adds a domain, returning `false` if it was already present.
    pub fn insert(&mut self, domain: Domain) -> bool {
        self.domains.insert(domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn contains(&self, domain: &Domain) -> bool {
        self.domains.contains(domain)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Domain> {
        self.domains.iter()
    }
}

impl FromIterator<Domain> for DomainBatch {
    fn from_iter<T: IntoIterator<Item = Domain>>(iter: T) -> Self {
        Self {
            domains: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DomainBatch {
    type Item = &'a Domain;
    type IntoIter = btree_set::Iter<'a, Domain>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.iter()
    }
}

impl IntoIterator for DomainBatch {
    type Item = Domain;
    type IntoIter = btree_set::IntoIter<Domain>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lowercases() {
        let domain = Domain::new("Example.COM").unwrap();
        assert_eq!(domain.as_str(), "example.com");
    }

    #[test]
    fn new_rejects_empty() {
        assert!(matches!(Domain::new(""), Err(CoreError::InvalidDomain(_))));
    }

    #[test]
    fn new_rejects_invalid_characters() {
        assert!(Domain::new("exa mple.com").is_err());
        assert!(Domain::new("example.com/path").is_err());
        assert!(Domain::new(".example.com").is_err());
    }

    #[test]
    fn new_rejects_overlong_names() {
        let label = "a".repeat(60);
        let name = [label.as_str(); 5].join(".");
        assert!(Domain::new(name).is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let domain = Domain::new("ya.ru").unwrap();
        assert_eq!(serde_json::to_string(&domain).unwrap(), "\"ya.ru\"");

        let parsed: Domain = serde_json::from_str("\"funbox.ru\"").unwrap();
        assert_eq!(parsed.as_str(), "funbox.ru");
        assert!(serde_json::from_str::<Domain>("\"\"").is_err());
    }

    #[test]
    fn batch_from_links_dedups_and_drops_unresolvable() {
        let batch = DomainBatch::from_links([
            "https://ya.ru",
            "https://ya.ru?q=123",
            "funbox.ru",
            "https://funbox.ru/q/python.pdf",
            "http://127.0.0.1/",
            "",
        ]);

        let names: Vec<_> = batch.iter().map(Domain::as_str).collect();
        assert_eq!(names, vec!["funbox.ru", "ya.ru"]);
    }

    #[test]
    fn batch_of_nothing_is_empty() {
        let batch = DomainBatch::from_links(Vec::<String>::new());
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn batch_insert_reports_duplicates() {
        let mut batch = DomainBatch::new();
        assert!(batch.insert(Domain::new("a.com").unwrap()));
        assert!(!batch.insert(Domain::new("a.com").unwrap()));
        assert_eq!(batch.len(), 1);
    }
}
