use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RecordId;

/// Product record as stored in the `products` collection.
///
/// `description` and `tags` may be absent in seed data; they stay absent on
/// output. Fields the engine does not know about are carried in `extra` so a
/// record leaves the server with the same shape it came in with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RecordId,
    pub category_id: RecordId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub price: f64,
    pub original_price: f64,
    pub in_stock: bool,
    pub rating: f64,
    /// ISO-8601 timestamp, kept verbatim.
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn is_on_sale(&self) -> bool {
        self.price < self.original_price
    }

    /// `needle` must already be lowercased.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
            || self
                .tags
                .iter()
                .flatten()
                .any(|tag| tag.to_lowercase().contains(needle))
    }

    /// Parsed `createdAt`. Accepts RFC 3339, a naive date-time, or a bare date
    /// (midnight UTC). Unparseable values yield `None`.
    pub fn created_at_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ── Query parameters ──────────────────────────────────────────────────────────

/// Raw `GET /api/products` query string. Interpreted by the query engine,
/// which substitutes defaults for anything missing or unrecognized.
#[derive(Debug, Deserialize, Default)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub availability: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}
