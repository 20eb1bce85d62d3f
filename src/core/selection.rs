//! Per-product variant and portion choices.
//!
//! Each product moves through `none → variant chosen → portion chosen`.
//! Choosing a different variant drops back to `variant chosen`; choosing the
//! active variant again removes the record.

use crate::domain::model::Product;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Choice {
    Variant { variant_id: String },
    Portion { variant_id: String, portion: String },
}

impl Choice {
    fn variant_id(&self) -> &str {
        match self {
            Choice::Variant { variant_id } | Choice::Portion { variant_id, .. } => variant_id,
        }
    }
}

/// Read view of a product's choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionRecord {
    pub variant_id: String,
    pub portion: Option<String>,
}

impl From<&Choice> for SelectionRecord {
    fn from(choice: &Choice) -> Self {
        match choice {
            Choice::Variant { variant_id } => SelectionRecord {
                variant_id: variant_id.clone(),
                portion: None,
            },
            Choice::Portion {
                variant_id,
                portion,
            } => SelectionRecord {
                variant_id: variant_id.clone(),
                portion: Some(portion.clone()),
            },
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct SelectionStore {
    choices: HashMap<String, Choice>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles `variant_id` for the product: the active variant is deselected,
    /// any other variant replaces it with no portion.
    pub fn select(&mut self, product_id: &str, variant_id: &str) {
        let is_active = self
            .choices
            .get(product_id)
            .is_some_and(|c| c.variant_id() == variant_id);

        if is_active {
            tracing::debug!("Deselecting variant {} of product {}", variant_id, product_id);
            self.choices.remove(product_id);
        } else {
            self.choose_variant(product_id, variant_id);
        }
    }

    /// Sets the active variant without toggling. Reasserting the current
    /// variant keeps its portion.
    pub fn choose_variant(&mut self, product_id: &str, variant_id: &str) {
        let keep_portion = self
            .choices
            .get(product_id)
            .is_some_and(|c| c.variant_id() == variant_id);
        if keep_portion {
            return;
        }

        tracing::debug!("Product {} now uses variant {}", product_id, variant_id);
        self.choices.insert(
            product_id.to_string(),
            Choice::Variant {
                variant_id: variant_id.to_string(),
            },
        );
    }

    /// Picks a portion for the product's active variant. No-op when nothing is selected.
    pub fn set_portion(&mut self, product_id: &str, portion: &str) {
        let Some(choice) = self.choices.get_mut(product_id) else {
            tracing::debug!("Ignoring portion '{}' for unselected product {}", portion, product_id);
            return;
        };

        *choice = Choice::Portion {
            variant_id: choice.variant_id().to_string(),
            portion: portion.to_string(),
        };
    }

    /// Like [`set_portion`](Self::set_portion) but only accepts portions the
    /// active variant lists. Returns whether the portion was applied.
    pub fn set_portion_checked(&mut self, product: &Product, portion: &str) -> bool {
        let offered = self
            .choices
            .get(&product.id)
            .and_then(|c| product.variant(c.variant_id()))
            .is_some_and(|v| v.offers_portion(portion));

        if offered {
            self.set_portion(&product.id, portion);
        }
        offered
    }

    pub fn get(&self, product_id: &str) -> Option<SelectionRecord> {
        self.choices.get(product_id).map(SelectionRecord::from)
    }

    pub fn is_selected(&self, product_id: &str, variant_id: &str) -> bool {
        self.choices
            .get(product_id)
            .is_some_and(|c| c.variant_id() == variant_id)
    }

    pub fn clear(&mut self, product_id: &str) {
        self.choices.remove(product_id);
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Records sorted by product id.
    pub fn records(&self) -> Vec<(String, SelectionRecord)> {
        let mut records: Vec<_> = self
            .choices
            .iter()
            .map(|(id, c)| (id.clone(), SelectionRecord::from(c)))
            .collect();
        records.sort_by(|a, b| a.0.cmp(&b.0));
        records
    }
}

/// Selection store shared across threads; every call holds the lock for its
/// whole duration so mutations stay serialized.
#[derive(Debug, Default, Clone)]
pub struct SharedSelectionStore {
    inner: Arc<Mutex<SelectionStore>>,
}

impl SharedSelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self, product_id: &str, variant_id: &str) {
        self.with(|store| store.select(product_id, variant_id))
    }

    pub fn set_portion(&self, product_id: &str, portion: &str) {
        self.with(|store| store.set_portion(product_id, portion))
    }

    pub fn get(&self, product_id: &str) -> Option<SelectionRecord> {
        self.with(|store| store.get(product_id))
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut SelectionStore) -> T) -> T {
        let mut store = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Recipe, Variant};

    fn record(variant_id: &str, portion: Option<&str>) -> Option<SelectionRecord> {
        Some(SelectionRecord {
            variant_id: variant_id.to_string(),
            portion: portion.map(str::to_string),
        })
    }

    fn product_with_variants() -> Product {
        let variant = |id: &str, portions: &[&str]| Variant {
            id: id.to_string(),
            name: id.to_uppercase(),
            images: vec![],
            portions: portions.iter().map(|p| p.to_string()).collect(),
        };
        Product {
            id: "p1".to_string(),
            name: "Pizza".to_string(),
            description: None,
            price: Some(9.0),
            promotion: None,
            availability: None,
            duration: None,
            photo: None,
            dish_type: None,
            category: None,
            recipe: Some(Recipe {
                variants: vec![variant("v1", &["S", "L"]), variant("v2", &["M"])],
            }),
        }
    }

    #[test]
    fn test_select_twice_deselects() {
        let mut store = SelectionStore::new();
        store.select("p1", "v1");
        store.select("p1", "v1");

        assert_eq!(store.get("p1"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_deselect_clears_portion() {
        let mut store = SelectionStore::new();
        store.select("p1", "v1");
        store.set_portion("p1", "S");
        store.select("p1", "v1");
        store.select("p1", "v1");

        assert_eq!(store.get("p1"), record("v1", None));
    }

    #[test]
    fn test_switching_variant_resets_portion() {
        let mut store = SelectionStore::new();
        store.select("p1", "v1");
        store.set_portion("p1", "L");
        store.select("p1", "v2");

        assert_eq!(store.get("p1"), record("v2", None));
    }

    #[test]
    fn test_portion_without_variant_is_ignored() {
        let mut store = SelectionStore::new();
        store.set_portion("p1", "L");

        assert_eq!(store.get("p1"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reasserting_variant_keeps_portion() {
        let mut store = SelectionStore::new();
        store.select("p1", "v1");
        store.set_portion("p1", "L");
        store.choose_variant("p1", "v1");

        assert_eq!(store.get("p1"), record("v1", Some("L")));
    }

    #[test]
    fn test_products_are_independent() {
        let mut store = SelectionStore::new();
        store.select("p1", "v1");
        store.set_portion("p1", "S");
        store.select("p2", "v9");
        store.select("p2", "v9");

        assert_eq!(store.get("p1"), record("v1", Some("S")));
        assert_eq!(store.get("p2"), None);
        assert!(store.is_selected("p1", "v1"));
        assert!(!store.is_selected("p1", "v2"));
    }

    #[test]
    fn test_checked_portion_must_belong_to_active_variant() {
        let product = product_with_variants();
        let mut store = SelectionStore::new();

        assert!(!store.set_portion_checked(&product, "S"));

        store.select("p1", "v2");
        assert!(!store.set_portion_checked(&product, "L"));
        assert_eq!(store.get("p1"), record("v2", None));

        assert!(store.set_portion_checked(&product, "M"));
        assert_eq!(store.get("p1"), record("v2", Some("M")));
    }

    #[test]
    fn test_records_are_sorted() {
        let mut store = SelectionStore::new();
        store.select("p2", "v1");
        store.select("p1", "v3");

        let ids: Vec<String> = store.records().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["p1".to_string(), "p2".to_string()]);
    }

    #[test]
    fn test_shared_store_serializes_across_threads() {
        let store = SharedSelectionStore::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let product = format!("p{}", i);
                    store.select(&product, "v1");
                    store.set_portion(&product, "L");
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.with(|s| s.len()), 8);
        assert_eq!(store.get("p3"), record("v1", Some("L")));
    }
}
