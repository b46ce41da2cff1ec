use reqwest::Response;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{OrderBody, SelectionBody};
use super::{ApiError, FetchGateway, ListQuery, MoveHint, Page, PersistAck, Settings};

/// Default base URL when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// [`FetchGateway`] over the REST endpoints under `{base}/api/`.
///
/// Cloning is cheap: `reqwest::Client` is reference counted and the base URL
/// is a small owned value.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    api_root: Url,
}

impl HttpGateway {
    /// Build a gateway for `base_url` (e.g. `http://localhost:5000`).
    ///
    /// The `/api/` segment is appended here; a trailing slash on the base is
    /// tolerated.
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let api_root = base.join("api/")?;
        tracing::debug!(api_root = %api_root, "Configured list API");
        Ok(Self { client, api_root })
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    fn endpoint(&self, name: &str) -> Result<Url, ApiError> {
        Ok(self.api_root.join(name)?)
    }

    /// Build the `items` URL. `search` and `noReorder` are only sent when set.
    fn items_url(&self, query: &ListQuery) -> Result<Url, ApiError> {
        let mut url = self.endpoint("items")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("limit", &query.limit.to_string());
            if !query.search.is_empty() {
                pairs.append_pair("search", &query.search);
            }
            if query.no_reorder {
                pairs.append_pair("noReorder", "true");
            }
        }
        Ok(url)
    }
}

/// Treat any non-2xx status as failure, then decode the JSON body.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::HttpStatus(status.as_u16()));
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl FetchGateway for HttpGateway {
    async fn list_items(&self, query: &ListQuery) -> Result<Page, ApiError> {
        let url = self.items_url(query)?;
        tracing::debug!(
            page = query.page,
            limit = query.limit,
            search = %query.search,
            no_reorder = query.no_reorder,
            "GET items"
        );
        let response = self.client.get(url).send().await?;
        let page: Page = decode(response).await?;
        tracing::debug!(
            received = page.items.len(),
            total = page.total_items,
            has_more = page.has_more,
            "Items received"
        );
        Ok(page)
    }

    async fn persist_selection(&self, ids: &[i64]) -> Result<PersistAck, ApiError> {
        let url = self.endpoint("selection")?;
        tracing::debug!(count = ids.len(), "POST selection");
        let response = self
            .client
            .post(url)
            .json(&SelectionBody { selected_ids: ids })
            .send()
            .await?;
        decode(response).await
    }

    async fn persist_order(
        &self,
        order: &[i64],
        hint: Option<MoveHint>,
    ) -> Result<PersistAck, ApiError> {
        let url = self.endpoint("order")?;
        tracing::debug!(count = order.len(), hint = ?hint, "POST order");
        let body = OrderBody {
            order,
            from_id: hint.map(|h| h.from_id),
            to_id: hint.map(|h| h.to_id),
        };
        let response = self.client.post(url).json(&body).send().await?;
        decode(response).await
    }

    async fn read_settings(&self) -> Result<Settings, ApiError> {
        let url = self.endpoint("settings")?;
        tracing::debug!("GET settings");
        let response = self.client.get(url).send().await?;
        decode(response).await
    }
}
