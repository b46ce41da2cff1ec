//! Remote collection API.
//!
//! This module defines the contract every list coordinator talks through and
//! the HTTP implementation used by the binary:
//!
//! - **Contract**: [`FetchGateway`], four async operations with one error type
//! - **Wire types**: [`Item`], [`Page`], [`Settings`] and the persist bodies
//! - **Transport**: [`HttpGateway`], a `reqwest` client against the REST API
//!
//! The gateway owns no list state and performs no retry, timeout or
//! cancellation. Callers that need to discard late responses do so above
//! this layer.

mod http;
mod types;

use std::future::Future;

pub use http::{HttpGateway, DEFAULT_BASE_URL};
pub use types::{ApiError, Item, ListQuery, MoveHint, Page, PersistAck, Settings};

/// The four remote operations the list controller depends on.
///
/// Implementations are cloned into spawned tasks, so they must be cheap to
/// clone and `Send + Sync`. Every returned future must be `Send`.
pub trait FetchGateway: Clone + Send + Sync + 'static {
    /// Fetch one page of the (optionally filtered) collection.
    fn list_items(&self, query: &ListQuery)
        -> impl Future<Output = Result<Page, ApiError>> + Send;

    /// Replace the server's selection with `ids`.
    fn persist_selection(
        &self,
        ids: &[i64],
    ) -> impl Future<Output = Result<PersistAck, ApiError>> + Send;

    /// Replace the server's order with `order`, optionally describing the move.
    fn persist_order(
        &self,
        order: &[i64],
        hint: Option<MoveHint>,
    ) -> impl Future<Output = Result<PersistAck, ApiError>> + Send;

    /// Read the stored settings (prior selection, custom order).
    fn read_settings(&self) -> impl Future<Output = Result<Settings, ApiError>> + Send;
}
