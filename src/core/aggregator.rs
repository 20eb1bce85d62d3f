use crate::domain::model::{CatalogTree, CategoryNode, Menu, PartialDegradation, Product};
use crate::domain::ports::CatalogSource;
use crate::utils::error::Result;
use crate::utils::validation::require_identifier;
use futures::future::join_all;

/// Joins a menu, its categories and every category's products into one tree.
///
/// Menu and category failures abort the run. A failed product fetch only
/// empties that category's product list.
pub struct CatalogAggregator<S: CatalogSource> {
    source: S,
}

impl<S: CatalogSource> CatalogAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn aggregate(&self, menu_id: Option<&str>) -> Result<CatalogTree> {
        let menu_id = require_identifier("menu id", menu_id)?;

        tracing::info!("🚀 Aggregating catalog for menu {}", menu_id);

        let menu = self.source.fetch_menu(menu_id).await?;
        tracing::debug!("Fetched menu '{}'", menu.name);

        let categories = self.source.fetch_categories(menu_id).await?;
        tracing::debug!("Fetched {} categories for menu {}", categories.len(), menu_id);

        let product_fetches = categories
            .iter()
            .map(|category| self.source.fetch_products(&category.id));
        let product_results = join_all(product_fetches).await;

        let mut degradations = Vec::new();
        let nodes: Vec<CategoryNode> = categories
            .into_iter()
            .zip(product_results)
            .map(|(category, result)| {
                let products = match result {
                    Ok(products) => products,
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ Products for category {} unavailable, showing it empty: {}",
                            category.id,
                            e
                        );
                        degradations.push(PartialDegradation {
                            category_id: category.id.clone(),
                            reason: e.to_string(),
                        });
                        Vec::new()
                    }
                };
                CategoryNode { category, products }
            })
            .collect();

        let first_image = nodes.first().and_then(|n| n.category.photo.clone());

        let tree = CatalogTree {
            menu,
            categories: nodes,
            first_image,
            degradations,
        };

        tracing::info!(
            "📊 Aggregated {} categories and {} products ({} degraded)",
            tree.categories.len(),
            tree.product_count(),
            tree.degradations.len()
        );

        Ok(tree)
    }

    /// Flat menu listing, no joins.
    pub async fn list_menus(&self) -> Result<Vec<Menu>> {
        self.source.fetch_menus().await
    }

    /// Flat product listing used by the landing page, no joins.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.source.fetch_all_products().await
    }
}
