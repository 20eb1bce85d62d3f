use crate::domain::model::{Category, Menu, Product};
use crate::domain::ports::{CatalogSource, ImageFetcher};
use crate::utils::error::{CatalogError, FetchTier, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// reqwest client for the catalog API. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| CatalogError::InvalidConfigValueError {
            field: "backend.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| CatalogError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::ConfigError {
                message: format!("Base URL cannot carry a path: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, tier: FetchTier, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!("Making API request to: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::fetch(tier, e.to_string()))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(CatalogError::fetch(tier, format!("HTTP {} from {}", status, url)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::fetch(tier, format!("invalid response body: {}", e)))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch_menu(&self, menu_id: &str) -> Result<Menu> {
        self.get_json(FetchTier::Menu, &["menu", menu_id]).await
    }

    async fn fetch_categories(&self, menu_id: &str) -> Result<Vec<Category>> {
        self.get_json(FetchTier::Category, &["category", "menu", menu_id])
            .await
    }

    async fn fetch_products(&self, category_id: &str) -> Result<Vec<Product>> {
        self.get_json(FetchTier::Product, &["product", "category", category_id])
            .await
    }

    async fn fetch_menus(&self) -> Result<Vec<Menu>> {
        self.get_json(FetchTier::Menu, &["menu"]).await
    }

    async fn fetch_all_products(&self) -> Result<Vec<Product>> {
        self.get_json(FetchTier::Product, &["product"]).await
    }
}

#[async_trait]
impl ImageFetcher for HttpCatalogClient {
    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::fetch(FetchTier::Image, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::fetch(FetchTier::Image, format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::fetch(FetchTier::Image, e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
