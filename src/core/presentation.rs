//! Display rules shared by the catalog views.

use crate::domain::model::{CatalogTree, Product};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::require_identifier;
use url::Url;

/// Interactive price label. Missing and zero prices read "N/A".
pub fn display_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p != 0.0 => format!("${}", p),
        _ => "$N/A".to_string(),
    }
}

/// Export price label. Missing prices become 0.00.
pub fn export_price(price: Option<f64>) -> String {
    format!("{:.2}", price.unwrap_or(0.0))
}

pub fn display_availability(product: &Product) -> &str {
    match product.availability.as_deref() {
        Some(a) if !a.is_empty() => a,
        _ => "N/A",
    }
}

pub fn display_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => fallback,
    }
}

/// Five-star rating, rounded half up.
pub fn star_rating(rate: Option<f64>) -> String {
    let Some(rate) = rate.filter(|r| r.is_finite()) else {
        return "No rating available".to_string();
    };
    let filled = (rate + 0.5).floor().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Landing-page product filter: dish type equality and case-insensitive name search.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub dish_type: Option<String>,
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(dish_type) = &self.dish_type {
            if product.dish_type.as_deref() != Some(dish_type.as_str()) {
                return false;
            }
        }
        match self.search.as_deref().filter(|q| !q.is_empty()) {
            Some(query) => product
                .name
                .to_lowercase()
                .contains(&query.to_lowercase()),
            None => true,
        }
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct non-empty dish types in first-seen order.
pub fn dish_type_options(products: &[Product]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for dish_type in products.iter().filter_map(|p| p.dish_type.as_deref()) {
        if !dish_type.is_empty() && !options.iter().any(|o| o == dish_type) {
            options.push(dish_type.to_string());
        }
    }
    options
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Forward,
    Backward,
}

/// The large preview image beside the category grid, replaced on hover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    current: Option<String>,
    direction: SlideDirection,
}

impl PreviewImage {
    pub fn seeded_from(tree: &CatalogTree) -> Self {
        Self {
            current: tree.first_image.clone(),
            direction: SlideDirection::Forward,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn direction(&self) -> SlideDirection {
        self.direction
    }

    /// Returns whether the image changed. Hovering an item without a photo is ignored.
    pub fn hover(&mut self, image: Option<&str>) -> bool {
        let Some(image) = image.filter(|i| !i.is_empty()) else {
            return false;
        };
        if self.current.as_deref() == Some(image) {
            return false;
        }
        self.direction = match self.current.as_deref() {
            Some(current) if image < current => SlideDirection::Backward,
            _ => SlideDirection::Forward,
        };
        self.current = Some(image.to_string());
        true
    }
}

/// Public page the menu QR code points at.
pub fn public_menu_url(frontend_base: &str, menu_id: Option<&str>) -> Result<Url> {
    let menu_id = require_identifier("menu id", menu_id)?;
    let link = format!("{}/public/menu/{}", frontend_base.trim_end_matches('/'), menu_id);
    Url::parse(&link).map_err(|e| CatalogError::InvalidConfigValueError {
        field: "frontend.public_base_url".to_string(),
        value: frontend_base.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::tests::product;
    use crate::domain::model::Menu;

    #[test]
    fn test_price_rules_differ_between_views() {
        assert_eq!(display_price(Some(12.5)), "$12.5");
        assert_eq!(display_price(Some(12.0)), "$12");
        assert_eq!(display_price(None), "$N/A");
        assert_eq!(export_price(None), "0.00");
        assert_eq!(export_price(Some(7.5)), "7.50");
    }

    #[test]
    fn test_fallback_labels() {
        let mut p = product("p1");
        p.availability = None;
        assert_eq!(display_availability(&p), "N/A");
        assert_eq!(display_or(p.promotion.as_deref(), "None"), "None");
        assert_eq!(display_or(Some("2 for 1"), "None"), "2 for 1");
    }

    #[test]
    fn test_star_rating() {
        assert_eq!(star_rating(Some(3.5)), "★★★★☆");
        assert_eq!(star_rating(Some(3.4)), "★★★☆☆");
        assert_eq!(star_rating(Some(9.0)), "★★★★★");
        assert_eq!(star_rating(None), "No rating available");
    }

    #[test]
    fn test_product_filter() {
        let mut pizza = product("p1");
        pizza.name = "Pizza Margherita".to_string();
        pizza.dish_type = Some("Main".to_string());
        let mut soup = product("p2");
        soup.name = "Onion soup".to_string();
        soup.dish_type = Some("Starter".to_string());
        let products = vec![pizza, soup];

        let by_type = ProductFilter {
            dish_type: Some("Starter".to_string()),
            search: None,
        };
        assert_eq!(by_type.apply(&products)[0].id, "p2");

        let by_name = ProductFilter {
            dish_type: None,
            search: Some("PIZZA".to_string()),
        };
        assert_eq!(by_name.apply(&products).len(), 1);
        assert_eq!(ProductFilter::default().apply(&products).len(), 2);
        assert_eq!(dish_type_options(&products), vec!["Main", "Starter"]);
    }

    #[test]
    fn test_preview_image_hover() {
        let tree = CatalogTree {
            menu: Menu {
                id: "m1".to_string(),
                name: "Lunch".to_string(),
                description: None,
                photo: None,
                rating: None,
            },
            categories: vec![],
            first_image: Some("/b.jpg".to_string()),
            degradations: vec![],
        };
        let mut preview = PreviewImage::seeded_from(&tree);
        assert_eq!(preview.current(), Some("/b.jpg"));

        assert!(!preview.hover(Some("/b.jpg")));
        assert!(!preview.hover(None));
        assert!(preview.hover(Some("/a.jpg")));
        assert_eq!(preview.direction(), SlideDirection::Backward);
        assert!(preview.hover(Some("/c.jpg")));
        assert_eq!(preview.direction(), SlideDirection::Forward);
        assert_eq!(preview.current(), Some("/c.jpg"));
    }

    #[test]
    fn test_public_menu_url() {
        let url = public_menu_url("http://192.168.1.20:5173/", Some("m1")).unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.20:5173/public/menu/m1");
        assert!(public_menu_url("http://localhost:5173", None).is_err());
    }
}
