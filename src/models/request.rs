//! Search and monitor requests read from the request file.

use super::term::{SearchTerm, TermKey, parse_terms};

/// The two kinds of request the front-end can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// One-shot ad-hoc search, keyed by a client generated ID.
    Search,
    /// Persistent item watch, keyed by the derived ID of the item name.
    Monitor,
}

/// A request ready to be sent to the Bazaar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub kind: RequestKind,

    /// Opaque ID written as the first column of every result row
    pub id: String,

    /// Raw term string as found in the request file
    pub raw: String,

    /// Terms to translate into the query URL
    pub terms: Vec<SearchTerm>,
}

impl Request {
    /// Build a search request from a `[Queries]` entry.
    pub fn search(id: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            kind: RequestKind::Search,
            id: id.into(),
            terms: parse_terms(&raw),
            raw,
        }
    }

    /// Build a monitor request from a `[Monitor]` entry.
    pub fn monitor(item_name: &str, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            kind: RequestKind::Monitor,
            id: derive_id(item_name),
            terms: monitor_terms(item_name, &raw),
            raw,
        }
    }
}

/// Stable ID for a monitored item: lowercase hex MD5 of the item name.
pub fn derive_id(item_name: &str) -> String {
    hex::encode(md5::compute(item_name.as_bytes()).0)
}

/// Price bound a `Compare` operator selects.
fn bound_for(op: &str) -> Option<TermKey> {
    match op {
        "<" | "<=" => Some(TermKey::PriceMax),
        ">" | ">=" => Some(TermKey::PriceMin),
        _ => None,
    }
}

/// Expand a monitor entry into translator terms.
///
/// The item name becomes the `Name` term. `Price` and `Compare` collapse into
/// a single `PriceMax` or `PriceMin` bound appended last; every other term is
/// passed through in order.
pub fn monitor_terms(item_name: &str, raw: &str) -> Vec<SearchTerm> {
    let mut terms = vec![SearchTerm::new(TermKey::Name, item_name)];
    let mut price: Option<String> = None;
    let mut bound: Option<TermKey> = None;

    for term in parse_terms(raw) {
        match term.key {
            TermKey::Price => price = Some(term.value),
            TermKey::Compare => match bound_for(&term.value) {
                Some(key) => bound = Some(key),
                None => log::warn!(
                    "Unknown compare operator '{}' for monitor item '{}'",
                    term.value,
                    item_name
                ),
            },
            // Name comes from the entry key
            TermKey::Name => {}
            _ => terms.push(term),
        }
    }

    match (bound, price) {
        (Some(key), Some(value)) => terms.push(SearchTerm::new(key, value)),
        (Some(_), None) => log::debug!("Monitor item '{}' has a compare but no price", item_name),
        _ => {}
    }

    terms
}
