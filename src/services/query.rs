// src/services/query.rs

//! Translation of search terms into a Bazaar search URL.

use url::form_urlencoded;

use crate::models::SearchTerm;

/// Build the query string for `terms`, in input order.
///
/// Terms whose key has no query parameter are skipped without error. Values
/// are form-urlencoded, so spaces become `+`.
pub fn build_query(terms: &[SearchTerm]) -> String {
    let mut query = String::new();
    for term in terms {
        let Some(param) = term.key.query_param() else {
            continue;
        };
        query.push('&');
        query.push_str(param);
        query.push('=');
        query.extend(form_urlencoded::byte_serialize(term.value.as_bytes()));
    }
    query
}

/// Append the translated terms to the search page URL.
pub fn build_query_url(base_url: &str, terms: &[SearchTerm]) -> String {
    format!("{}{}", base_url, build_query(terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TermKey, parse_terms};

    const BASE: &str = "https://www.lazaruseq.com/Magelo/index.php?page=bazaar";

    #[test]
    fn test_name_is_encoded() {
        let terms = vec![SearchTerm::new(TermKey::Name, "Fabled Earthshaker")];
        let url = build_query_url(BASE, &terms);
        assert!(url.ends_with("&item=Fabled+Earthshaker"));
        assert!(url.starts_with(BASE));
    }

    #[test]
    fn test_all_keys_in_input_order() {
        let terms = parse_terms(concat!(
            "Direction|1/Name|Sword/Class|4096/Race|32/Stat|ac/",
            "Slot|131072/Aug|7/Type|2/PriceMin|1/PriceMax|99",
        ));
        let expected = concat!(
            "&direction=1&item=Sword&class=4096&race=32&stat=ac",
            "&slot=131072&aug_type=7&type=2&pricemin=1&pricemax=99",
        );
        assert_eq!(build_query(&terms), expected);
    }

    #[test]
    fn test_unknown_and_monitor_keys_are_skipped() {
        let terms = parse_terms("Colour|red/Price|100/Compare|</Name|Sword");
        assert_eq!(build_query(&terms), "&item=Sword");
        assert_eq!(build_query(&parse_terms("Colour|red")), "");
    }

    #[test]
    fn test_repeated_keys_are_kept() {
        let terms = parse_terms("Stat|ac/Stat|hp");
        assert_eq!(build_query(&terms), "&stat=ac&stat=hp");
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let terms = vec![SearchTerm::new(TermKey::Name, "Shaman's Totem & Co.")];
        assert_eq!(build_query(&terms), "&item=Shaman%27s+Totem+%26+Co.");
    }

    #[test]
    fn test_translation_is_deterministic() {
        let terms = parse_terms("/Name|Item name/Stat|ac/Class|4096");
        assert_eq!(build_query_url(BASE, &terms), build_query_url(BASE, &terms));
    }
}
