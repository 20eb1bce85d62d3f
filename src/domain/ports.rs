use crate::domain::model::{Category, Menu, Product};
use crate::utils::error::Result;
use async_trait::async_trait;
use url::Url;

/// Read access to the catalog API. Every method maps to one HTTP request.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_menu(&self, menu_id: &str) -> Result<Menu>;
    async fn fetch_categories(&self, menu_id: &str) -> Result<Vec<Category>>;
    async fn fetch_products(&self, category_id: &str) -> Result<Vec<Product>>;
    async fn fetch_menus(&self) -> Result<Vec<Menu>>;
    async fn fetch_all_products(&self) -> Result<Vec<Product>>;
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
