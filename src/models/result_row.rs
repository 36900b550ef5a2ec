//! Result row data structure.

use serde::{Deserialize, Serialize};

/// Column names of the result files, in order.
pub const HEADER: [&str; 4] = ["QueryID", "Item", "Price", "Seller"];

/// One Bazaar listing matched by a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultRow {
    /// Request ID the listing was found for
    #[serde(rename = "QueryID")]
    pub query_id: String,

    #[serde(rename = "Item")]
    pub item: String,

    #[serde(rename = "Price")]
    pub price: String,

    #[serde(rename = "Seller")]
    pub seller: String,
}

impl ResultRow {
    /// Build a row from scraped cell texts.
    ///
    /// Returns `None` when there are no cells. Missing cells become empty
    /// strings and cells past the seller column are dropped.
    pub fn from_cells(query_id: &str, cells: Vec<String>) -> Option<Self> {
        if cells.is_empty() {
            return None;
        }
        let mut cells = cells.into_iter();
        Some(Self {
            query_id: query_id.to_string(),
            item: cells.next().unwrap_or_default(),
            price: cells.next().unwrap_or_default(),
            seller: cells.next().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_cells() {
        let row = ResultRow::from_cells("abc", cells(&["Velium Shard", "900", "Trader"])).unwrap();
        assert_eq!(row.query_id, "abc");
        assert_eq!(row.item, "Velium Shard");
        assert_eq!(row.price, "900");
        assert_eq!(row.seller, "Trader");
    }

    #[test]
    fn test_from_cells_pads_and_truncates() {
        let short = ResultRow::from_cells("abc", cells(&["Velium Shard"])).unwrap();
        assert_eq!(short.price, "");
        assert_eq!(short.seller, "");

        let long = ResultRow::from_cells("abc", cells(&["a", "b", "c", "d"])).unwrap();
        assert_eq!(long.seller, "c");
    }

    #[test]
    fn test_from_cells_empty() {
        assert!(ResultRow::from_cells("abc", Vec::new()).is_none());
    }
}
