use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors produced by a [`FetchGateway`](super::FetchGateway) call.
///
/// Downstream code never branches on the variant; every failure is shown to
/// the user as its `Display` message. The variants exist for logging and tests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, body read)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body was not the expected JSON shape
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// Configured base URL could not be parsed or joined
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

// ============================================================================
// Wire Types
// ============================================================================

/// A single row of the remote collection.
///
/// `id` is the identity; `value` is opaque display text. `selected` is derived
/// locally from the selection set whenever an item enters the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub value: String,
    #[serde(default)]
    pub selected: bool,
}

impl Item {
    pub fn new(id: i64, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            selected: false,
        }
    }
}

/// One page of the list query response.
///
/// `has_more` is trusted as sent; the client never recomputes it from the
/// other fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Item>,
    pub total_items: u64,
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    pub has_more: bool,
}

/// Server-side settings read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub selected_ids: Vec<i64>,
    pub custom_order: Option<Vec<i64>>,
}

/// Acknowledgement returned by the persist endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistAck {
    pub success: bool,
}

/// Parameters of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    /// Ask the server not to apply its custom order to this page.
    pub no_reorder: bool,
}

/// The drag gesture that produced an order, sent alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveHint {
    pub from_id: i64,
    pub to_id: i64,
}

/// Body of `POST /api/selection`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelectionBody<'a> {
    pub selected_ids: &'a [i64],
}

/// Body of `POST /api/order`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderBody<'a> {
    pub order: &'a [i64],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_id: Option<i64>,
}
