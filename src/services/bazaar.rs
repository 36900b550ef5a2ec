// src/services/bazaar.rs

//! Bazaar scrape client.
//!
//! Fetches the search page for a request and turns the results table into
//! [`ResultRow`]s.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{BazaarConfig, HttpConfig, ResultRow, SearchTerm};
use crate::services::query::build_query_url;
use crate::utils::http;

/// Anything that can answer a Bazaar query.
///
/// `Ok(vec![])` means the search ran and matched nothing; `Err` means the
/// search did not run and previous results must be left alone.
#[async_trait]
pub trait BazaarSource: Send + Sync {
    async fn query(&self, query_id: &str, terms: &[SearchTerm]) -> Result<Vec<ResultRow>>;
}

/// HTTP client for the web Bazaar.
pub struct BazaarClient {
    client: reqwest::Client,
    base_url: String,
    table_selector: String,
}

impl BazaarClient {
    /// Create a client for the configured Bazaar page.
    pub fn new(http_config: &HttpConfig, bazaar: &BazaarConfig) -> Result<Self> {
        parse_selector(&bazaar.table_selector)?;
        Ok(Self {
            client: http::create_async_client(http_config)?,
            base_url: bazaar.base_url.clone(),
            table_selector: bazaar.table_selector.clone(),
        })
    }

    /// URL that would be fetched for `terms`.
    pub fn query_url(&self, terms: &[SearchTerm]) -> String {
        build_query_url(&self.base_url, terms)
    }

    /// Extract result rows from a search page.
    pub fn parse_results(&self, html: &str, query_id: &str) -> Result<Vec<ResultRow>> {
        let table_sel = parse_selector(&self.table_selector)?;
        let row_sel = parse_selector("tr")?;

        let document = Html::parse_document(html);
        let table = document
            .select(&table_sel)
            .next()
            .ok_or_else(|| AppError::scrape(query_id, "results table not found"))?;

        let rows = table
            .select(&row_sel)
            .filter_map(|tr| ResultRow::from_cells(query_id, cell_texts(&tr)))
            .collect();
        Ok(rows)
    }
}

#[async_trait]
impl BazaarSource for BazaarClient {
    async fn query(&self, query_id: &str, terms: &[SearchTerm]) -> Result<Vec<ResultRow>> {
        let url = self.query_url(terms);
        log::debug!("[{}] Query URL: {}", query_id, url);

        let html = http::fetch_text(&self.client, &url).await?;
        let rows = self.parse_results(&html, query_id)?;

        log::debug!("[{}] Bazaar search found {} results", query_id, rows.len());
        Ok(rows)
    }
}

/// Trimmed text of the direct `td` children of a row.
fn cell_texts(row: &ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == "td")
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BazaarClient {
        BazaarClient::new(&HttpConfig::default(), &BazaarConfig::default()).unwrap()
    }

    const PAGE: &str = r#"
        <html><body>
        <table class="CB_Table CB_Highlight_Rows">
            <tr><th>Item</th><th>Price</th><th>Seller</th></tr>
            <tr><td> Fabled Earthshaker </td><td>12,000</td><td>Bob</td></tr>
            <tr></tr>
            <tr><td>Fabled Earthshaker</td><td> 9,500 </td><td>Alice</td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_skips_empty_rows() {
        let rows = client().parse_results(PAGE, "abc").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.query_id == "abc"));
        assert_eq!(rows[0].item, "Fabled Earthshaker");
        assert_eq!(rows[0].price, "12,000");
        assert_eq!(rows[1].price, "9,500");
        assert_eq!(rows[1].seller, "Alice");
    }

    #[test]
    fn test_parse_results_empty_table_is_ok() {
        let page = r#"<table class="CB_Table CB_Highlight_Rows"><tr><th>Item</th></tr></table>"#;
        assert!(client().parse_results(page, "abc").unwrap().is_empty());
    }

    #[test]
    fn test_parse_results_missing_table_is_error() {
        let page = "<html><body><p>Service unavailable</p></body></html>";
        assert!(client().parse_results(page, "abc").is_err());
    }

    #[test]
    fn test_parse_results_ignores_other_tables() {
        let page = r#"
            <table class="CB_Table"><tr><td>menu</td></tr></table>
            <table class="CB_Table CB_Highlight_Rows">
                <tr><td>Sword</td><td>1</td><td>Eve</td></tr>
            </table>
        "#;
        let rows = client().parse_results(page, "id").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item, "Sword");
    }

    #[test]
    fn test_query_url_uses_base() {
        let terms = crate::models::parse_terms("Name|Fabled Earthshaker");
        let url = client().query_url(&terms);
        assert_eq!(
            url,
            "https://www.lazaruseq.com/Magelo/index.php?page=bazaar&item=Fabled+Earthshaker"
        );
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }
}
