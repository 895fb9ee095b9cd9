//! Row endpoints (`/rest/v1/<table>`).
//!
//! Writes ask for `return=representation` so callers can tell how many rows
//! a filtered update or delete actually matched.

use reqwest::Method;
use sc_core::error::ScResult;

use crate::client::{ApiClient, Surface};

/// Listing direction for the order column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// What a write returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returning {
    /// The written rows. Needs select rights on the table.
    Representation,
    /// Nothing; for anonymous inserts into write-only tables.
    Minimal,
}

impl Returning {
    fn prefer_header(&self) -> &'static str {
        match self {
            Returning::Representation => RETURN_REPRESENTATION,
            Returning::Minimal => "return=minimal",
        }
    }
}

const RETURN_REPRESENTATION: &str = "return=representation";

impl ApiClient {
    /// Select every row of `table`, ordered by `order_column`.
    pub async fn select_rows(
        &self,
        table: &str,
        order_column: &str,
        order: SortOrder,
        bearer: Option<&str>,
    ) -> ScResult<Vec<serde_json::Value>> {
        let order_param = format!("{order_column}.{}", order.as_param());
        let builder = self
            .request(Method::GET, Surface::Rest, &format!("/{table}"), bearer)
            .query(&[("select", "*"), ("order", order_param.as_str())]);
        let resp = self
            .send(Surface::Rest, builder, &format!("GET rest/{table}"))
            .await?;
        ApiClient::parse_json(resp).await
    }

    /// Insert one row. With `Returning::Minimal` the result is always empty.
    pub async fn insert_row(
        &self,
        table: &str,
        row: &serde_json::Value,
        returning: Returning,
        bearer: Option<&str>,
    ) -> ScResult<Vec<serde_json::Value>> {
        let body = serde_json::Value::Array(vec![row.clone()]);
        let builder = self
            .request(Method::POST, Surface::Rest, &format!("/{table}"), bearer)
            .header("Prefer", returning.prefer_header())
            .json(&body);
        let resp = self
            .send(Surface::Rest, builder, &format!("POST rest/{table}"))
            .await?;
        match returning {
            Returning::Representation => ApiClient::parse_json(resp).await,
            Returning::Minimal => Ok(Vec::new()),
        }
    }

    /// Patch the row whose `id` equals `id`; returns the rows matched.
    pub async fn update_rows_by_id(
        &self,
        table: &str,
        id: &str,
        patch: &serde_json::Value,
        bearer: Option<&str>,
    ) -> ScResult<Vec<serde_json::Value>> {
        let filter = format!("eq.{id}");
        let builder = self
            .request(Method::PATCH, Surface::Rest, &format!("/{table}"), bearer)
            .query(&[("id", filter.as_str())])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);
        let resp = self
            .send(Surface::Rest, builder, &format!("PATCH rest/{table} id={id}"))
            .await?;
        ApiClient::parse_json(resp).await
    }

    /// Delete the row whose `id` equals `id`; returns the rows removed.
    pub async fn delete_rows_by_id(
        &self,
        table: &str,
        id: &str,
        bearer: Option<&str>,
    ) -> ScResult<Vec<serde_json::Value>> {
        let filter = format!("eq.{id}");
        let builder = self
            .request(Method::DELETE, Surface::Rest, &format!("/{table}"), bearer)
            .query(&[("id", filter.as_str())])
            .header("Prefer", RETURN_REPRESENTATION);
        let resp = self
            .send(Surface::Rest, builder, &format!("DELETE rest/{table} id={id}"))
            .await?;
        ApiClient::parse_json(resp).await
    }
}
