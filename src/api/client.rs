use super::constants::{self, headers, BULK_CHUNK_SIZE, LIST_PAGE_SIZE};
use super::error::ApiError;
use super::models::{ListingPage, ListingPageList, ListingPageResponse};
use super::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Everything needed to address one organization / tracking id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub organization_id: String,
    pub tracking_id: String,
    pub access_token: String,
    pub platform_url: String,
}

/// Commerce API client for one organization and tracking id
#[derive(Clone)]
pub struct CoveoClient {
    settings: ConnectionSettings,
    transport: Arc<dyn Transport>,
    page_size: u32,
}

impl CoveoClient {
    pub fn new(settings: ConnectionSettings) -> Result<Self, ApiError> {
        Ok(Self::with_transport(settings, Arc::new(ReqwestTransport::new()?)))
    }

    /// Create a client over a custom transport
    pub fn with_transport(settings: ConnectionSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
            page_size: LIST_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn tracking_id(&self) -> &str {
        &self.settings.tracking_id
    }

    fn platform_url(&self) -> &str {
        &self.settings.platform_url
    }

    fn org(&self) -> &str {
        &self.settings.organization_id
    }

    /// Send with bearer auth and fail on non-success statuses
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request = request
            .header(
                headers::AUTHORIZATION,
                format!("Bearer {}", self.settings.access_token),
            )
            .header(headers::ACCEPT, headers::CONTENT_TYPE_JSON);
        self.transport.send(request).await?.error_for_status()
    }

    async fn send_json(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.send(request).await?.json()
    }

    /// Bulk-create listings, 50 per request
    pub async fn bulk_create(&self, listings: &[ListingPage]) -> Result<Vec<Value>, ApiError> {
        let url = constants::bulk_create_endpoint(self.platform_url(), self.org());
        self.send_chunks(Method::POST, &url, listings, "create", |r| r.json())
            .await
    }

    /// Bulk-update listings (each must carry its `id`), 50 per request
    pub async fn bulk_update(&self, listings: &[ListingPage]) -> Result<Vec<Value>, ApiError> {
        let url = constants::bulk_update_endpoint(self.platform_url(), self.org());
        self.send_chunks(Method::PUT, &url, listings, "update", |r| r.json())
            .await
    }

    /// Bulk-delete listings by id, 50 per request
    ///
    /// Only the status matters; the response body is not read.
    pub async fn bulk_delete(&self, ids: &[String]) -> Result<(), ApiError> {
        let url = constants::bulk_delete_endpoint(self.platform_url(), self.org());
        self.send_chunks(Method::POST, &url, ids, "delete", |_| Ok(()))
            .await?;
        Ok(())
    }

    /// Chunks go out one after another; the first failure aborts the rest
    async fn send_chunks<T, R, F>(
        &self,
        method: Method,
        url: &str,
        items: &[T],
        action: &str,
        read_body: F,
    ) -> Result<Vec<R>, ApiError>
    where
        T: Serialize,
        F: Fn(ApiResponse) -> Result<R, ApiError>,
    {
        let total_chunks = items.len().div_ceil(BULK_CHUNK_SIZE);
        let mut results = Vec::with_capacity(total_chunks);

        for (index, chunk) in items.chunks(BULK_CHUNK_SIZE).enumerate() {
            log::debug!(
                "Bulk {} chunk {}/{} ({} items)",
                action,
                index + 1,
                total_chunks,
                chunk.len()
            );
            let request = ApiRequest::new(method.clone(), url).json(serde_json::to_value(chunk)?);
            match self.send(request).await.and_then(&read_body) {
                Ok(body) => results.push(body),
                Err(e) => {
                    log::error!(
                        "Failed to {} chunk {}/{}: {}",
                        action,
                        index + 1,
                        total_chunks,
                        e
                    );
                    return Err(e);
                }
            }
        }

        log::info!("Bulk {} sent {} items in {} requests", action, items.len(), total_chunks);
        Ok(results)
    }

    /// Page through every listing for the configured tracking id
    pub async fn fetch_all_listings(&self) -> Result<Vec<ListingPageResponse>, ApiError> {
        let url = constants::listings_endpoint(self.platform_url(), self.org());
        let mut page: u32 = 0;
        let mut all_items = Vec::new();

        loop {
            let request = ApiRequest::get(&url)
                .query("trackingId", self.tracking_id())
                .query("page", page)
                .query("perPage", self.page_size);
            let list: ListingPageList = serde_json::from_value(self.send_json(request).await?)?;

            if list.items.is_empty() {
                break;
            }
            all_items.extend(list.items);
            // Without a reported total, keep going until an empty page
            if list.total_pages.is_some_and(|total| page + 1 >= total) {
                break;
            }
            page += 1;
        }

        log::info!(
            "Fetched {} listings for tracking id {}",
            all_items.len(),
            self.tracking_id()
        );
        Ok(all_items)
    }

    /// Fetch one listing with its full rule set
    pub async fn fetch_listing(&self, id: &str) -> Result<ListingPageResponse, ApiError> {
        let url = constants::listing_endpoint(self.platform_url(), self.org(), id);
        let request = ApiRequest::get(url).query("trackingId", self.tracking_id());
        Ok(serde_json::from_value(self.send_json(request).await?)?)
    }

    /// GET a configuration document, optionally scoped by tracking id
    pub async fn get_document(&self, url: &str, with_tracking_id: bool) -> Result<Value, ApiError> {
        let mut request = ApiRequest::get(url);
        if with_tracking_id {
            request = request.query("trackingId", self.tracking_id());
        }
        self.send_json(request).await
    }

    /// PUT a configuration document
    pub async fn put_document(
        &self,
        url: &str,
        body: &Value,
        with_tracking_id: bool,
    ) -> Result<Value, ApiError> {
        let mut request = ApiRequest::put(url).json(body.clone());
        if with_tracking_id {
            request = request.query("trackingId", self.tracking_id());
        }
        self.send_json(request).await
    }

    /// POST a configuration document
    pub async fn post_document(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        self.send_json(ApiRequest::post(url).json(body.clone())).await
    }

    /// Run a Search API v2 query
    pub async fn search(&self, body: Value) -> Result<Value, ApiError> {
        let request = ApiRequest::post(constants::search_endpoint(self.platform_url()))
            .header(headers::ORGANIZATION_ID, self.org())
            .json(body);
        self.send_json(request).await
    }
}
