use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default, rename = "rate")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, rename = "libelle")]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default, rename = "menu")]
    pub menu_id: Option<String>,
}

/// `categoryFK` arrives either as a bare id or populated with its owning menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Embedded {
        #[serde(rename = "_id", default)]
        id: Option<String>,
        #[serde(default)]
        menu: Option<String>,
    },
}

impl CategoryRef {
    pub fn menu_id(&self) -> Option<&str> {
        match self {
            CategoryRef::Id(_) => None,
            CategoryRef::Embedded { menu, .. } => menu.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub portions: Vec<String>,
}

impl Variant {
    pub fn offers_portion(&self, portion: &str) -> bool {
        self.portions.iter().any(|p| p == portion)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub promotion: Option<String>,
    #[serde(default, rename = "disponibility")]
    pub availability: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub duration: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default, rename = "typePlat")]
    pub dish_type: Option<String>,
    #[serde(default, rename = "categoryFK")]
    pub category: Option<CategoryRef>,
    #[serde(default, rename = "recipeFK")]
    pub recipe: Option<Recipe>,
}

impl Product {
    pub fn variants(&self) -> &[Variant] {
        self.recipe
            .as_ref()
            .map(|r| r.variants.as_slice())
            .unwrap_or(&[])
    }

    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants().iter().find(|v| v.id == variant_id)
    }

    pub fn is_available(&self) -> bool {
        self.availability.as_deref() == Some("Available")
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A category joined with the products fetched for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// A per-category product fetch that failed and was replaced by an empty list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialDegradation {
    pub category_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogTree {
    pub menu: Menu,
    pub categories: Vec<CategoryNode>,
    /// First category photo, used to seed the preview image.
    pub first_image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<PartialDegradation>,
}

impl CatalogTree {
    pub fn category(&self, category_id: &str) -> Option<&CategoryNode> {
        self.categories.iter().find(|c| c.category.id == category_id)
    }

    /// The category whose photo is currently shown as the preview image.
    pub fn category_for_image(&self, photo: &str) -> Option<&CategoryNode> {
        self.categories
            .iter()
            .find(|c| c.category.photo.as_deref() == Some(photo))
    }

    pub fn product_count(&self) -> usize {
        self.categories.iter().map(|c| c.products.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_wire_names() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Margherita",
            "price": 12.5,
            "disponibility": "Available",
            "duration": 15,
            "typePlat": "Pizza",
            "categoryFK": {"_id": "c1", "menu": "m1"},
            "recipeFK": {
                "variants": [
                    {"_id": "v1", "name": "Classic", "images": ["/uploads/v1.jpg"], "portions": ["S", "L"]}
                ]
            }
        }))
        .unwrap();

        assert_eq!(product.price, Some(12.5));
        assert!(product.is_available());
        assert_eq!(product.duration.as_deref(), Some("15"));
        assert_eq!(product.dish_type.as_deref(), Some("Pizza"));
        assert_eq!(product.category.as_ref().and_then(|c| c.menu_id()), Some("m1"));
        assert!(product.variant("v1").unwrap().offers_portion("L"));
        assert!(product.variant("v2").is_none());
    }

    #[test]
    fn test_sparse_product_defaults() {
        let product: Product =
            serde_json::from_value(serde_json::json!({"_id": "p2", "categoryFK": "c1"})).unwrap();

        assert_eq!(product.price, None);
        assert!(!product.is_available());
        assert!(product.variants().is_empty());
        assert_eq!(product.category, Some(CategoryRef::Id("c1".to_string())));
    }

    #[test]
    fn test_category_reads_label_and_menu() {
        let category: Category = serde_json::from_value(serde_json::json!({
            "_id": "c1", "libelle": "Starters", "menu": "m1", "photo": "/uploads/c1.png"
        }))
        .unwrap();

        assert_eq!(category.label, "Starters");
        assert_eq!(category.menu_id.as_deref(), Some("m1"));
    }
}
