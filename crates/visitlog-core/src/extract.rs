//! Registrable domain extraction.
//!
//! Links arrive in whatever shape the client recorded them: full URLs,
//! bare hosts, hosts with a query string. They are reduced to the domain
//! an end user could register under the Public Suffix List, so that
//! `https://a.b.example.co.uk/x` and `example.co.uk` count as one visit.
//! The suffix list is compiled into the binary; extraction performs no I/O.

use crate::domain::Domain;
use url::{ParseError, Url};

/// Extracts the registrable domain from a link.
///
/// Returns `None` when the link has no registrable domain: IP addresses,
/// bare public suffixes, single-label hosts, hosts under an unknown
/// top-level domain, and malformed input.
///
/// ```
/// use visitlog_core::extract_domain;
///
/// let domain = extract_domain("https://a.b.example.co.uk/x").unwrap();
/// assert_eq!(domain.as_str(), "example.co.uk");
/// assert!(extract_domain("http://127.0.0.1:8080/").is_none());
/// ```
pub fn extract_domain(link: &str) -> Option<Domain> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let url = parse_link(link)?;
    let host = url.domain()?.trim_end_matches('.').to_ascii_lowercase();
    let root = icann_root(&host)?;

    Domain::new(root).ok()
}

/// Returns the registrable domain of `host` under the ICANN section of the
/// Public Suffix List.
///
/// Private suffixes are not registration boundaries here, so
/// `user.github.io` resolves to `github.io`. Hosts under a suffix the list
/// does not know have no registrable domain.
fn icann_root(host: &str) -> Option<&str> {
    let name = addr::parse_domain_name(host).ok()?;
    if name.is_icann() {
        return name.root();
    }
    if !name.is_private() {
        return None;
    }

    let suffix = icann_suffix(host)?;
    let rest = host.strip_suffix(suffix)?.strip_suffix('.')?;
    let label = rest.rsplit('.').next()?;
    host.get(host.len() - suffix.len() - label.len() - 1..)
}

/// Longest tail of `host` that is itself an ICANN public suffix.
fn icann_suffix(host: &str) -> Option<&str> {
    std::iter::successors(Some(host), |tail| tail.split_once('.').map(|(_, rest)| rest)).find(
        |tail| {
            addr::parse_domain_name(tail)
                .map(|name| name.is_icann() && name.suffix() == *tail)
                .unwrap_or(false)
        },
    )
}

/// Parses a link as an absolute URL, assuming `http` when no usable
/// scheme is present.
fn parse_link(link: &str) -> Option<Url> {
    match Url::parse(link) {
        Ok(url) if url.host().is_some() => Some(url),
        // `ya.ru:8080` parses with scheme `ya.ru` and no host.
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("http://{link}")).ok()
        }
        Err(_) => None,
    }
}
