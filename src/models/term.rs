//! Search terms and the `Key|Value/Key|Value` term string grammar.

use std::fmt;

/// Separator between segments of a term string.
const SEGMENT_SEP: char = '/';

/// Separator between a key and its value inside a segment.
const KEY_VALUE_SEP: char = '|';

/// Recognized search term keys.
///
/// Matching is case-sensitive. Anything else is kept as `Other` so the parsed
/// list reflects the input, but the translator ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKey {
    Name,
    Class,
    Race,
    Stat,
    Slot,
    Aug,
    Type,
    PriceMin,
    PriceMax,
    Direction,
    Compare,
    Price,
    Other(String),
}

impl TermKey {
    /// Parse a raw key. Never fails; unknown keys become `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Name" => Self::Name,
            "Class" => Self::Class,
            "Race" => Self::Race,
            "Stat" => Self::Stat,
            "Slot" => Self::Slot,
            "Aug" => Self::Aug,
            "Type" => Self::Type,
            "PriceMin" => Self::PriceMin,
            "PriceMax" => Self::PriceMax,
            "Direction" => Self::Direction,
            "Compare" => Self::Compare,
            "Price" => Self::Price,
            other => Self::Other(other.to_string()),
        }
    }

    /// Query parameter name on the Bazaar search page, if the key maps to one.
    ///
    /// `Compare` and `Price` only carry meaning for monitor entries and are
    /// rewritten into `PriceMin`/`PriceMax` before translation.
    pub fn query_param(&self) -> Option<&'static str> {
        match self {
            Self::Name => Some("item"),
            Self::Class => Some("class"),
            Self::Race => Some("race"),
            Self::Stat => Some("stat"),
            Self::Slot => Some("slot"),
            Self::Aug => Some("aug_type"),
            Self::Type => Some("type"),
            Self::PriceMin => Some("pricemin"),
            Self::PriceMax => Some("pricemax"),
            Self::Direction => Some("direction"),
            Self::Compare | Self::Price | Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Name => "Name",
            Self::Class => "Class",
            Self::Race => "Race",
            Self::Stat => "Stat",
            Self::Slot => "Slot",
            Self::Aug => "Aug",
            Self::Type => "Type",
            Self::PriceMin => "PriceMin",
            Self::PriceMax => "PriceMax",
            Self::Direction => "Direction",
            Self::Compare => "Compare",
            Self::Price => "Price",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single key/value search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub key: TermKey,
    pub value: String,
}

impl SearchTerm {
    pub fn new(key: TermKey, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.key, KEY_VALUE_SEP, self.value)
    }
}

/// Parse a term string such as `/Name|Item name/Stat|ac/Class|4096`.
///
/// Segments are split on `/`, then each segment once on `|`. Empty segments
/// are ignored; segments without a `|` or with an empty key are logged and
/// skipped.
pub fn parse_terms(raw: &str) -> Vec<SearchTerm> {
    raw.split(SEGMENT_SEP)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| match segment.split_once(KEY_VALUE_SEP) {
            Some((key, value)) if !key.trim().is_empty() => {
                Some(SearchTerm::new(TermKey::parse(key.trim()), value.trim()))
            }
            _ => {
                log::debug!("Skipping malformed term segment '{}'", segment);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_terms_full_query() {
        let terms = parse_terms("/Name|Item name/Stat|ac/Class|4096/Race|32/Slot|131072");
        assert_eq!(
            terms,
            vec![
                SearchTerm::new(TermKey::Name, "Item name"),
                SearchTerm::new(TermKey::Stat, "ac"),
                SearchTerm::new(TermKey::Class, "4096"),
                SearchTerm::new(TermKey::Race, "32"),
                SearchTerm::new(TermKey::Slot, "131072"),
            ]
        );
    }

    #[test]
    fn test_parse_terms_trailing_separator() {
        let terms = parse_terms("Price|1000/Compare|<=/");
        assert_eq!(
            terms,
            vec![
                SearchTerm::new(TermKey::Price, "1000"),
                SearchTerm::new(TermKey::Compare, "<="),
            ]
        );
    }

    #[test]
    fn test_parse_terms_keeps_unknown_keys() {
        let terms = parse_terms("Colour|red/Name|Velium Shard");
        assert_eq!(terms[0].key, TermKey::Other("Colour".to_string()));
        assert_eq!(terms[1].key, TermKey::Name);
    }

    #[test]
    fn test_parse_terms_is_case_sensitive() {
        let terms = parse_terms("name|Velium Shard");
        assert_eq!(terms[0].key, TermKey::Other("name".to_string()));
        assert!(terms[0].key.query_param().is_none());
    }

    #[test]
    fn test_parse_terms_skips_malformed_segments() {
        let terms = parse_terms("garbage//|novalue/Name|Cloak of Flames");
        assert_eq!(
            terms,
            vec![SearchTerm::new(TermKey::Name, "Cloak of Flames")]
        );
    }

    #[test]
    fn test_value_may_contain_key_separator() {
        let terms = parse_terms("Name|a|b");
        assert_eq!(terms[0].value, "a|b");
    }

    #[test]
    fn test_display_round_trips_key() {
        let term = SearchTerm::new(TermKey::PriceMax, "1000");
        assert_eq!(term.to_string(), "PriceMax|1000");
    }
}
