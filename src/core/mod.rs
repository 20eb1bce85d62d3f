pub mod aggregator;
pub mod export;
pub mod images;
pub mod pdf;
pub mod presentation;
pub mod raster;
pub mod selection;
pub mod session;

pub use crate::domain::model::{CatalogTree, Category, CategoryNode, Menu, Product, Variant};
pub use crate::domain::ports::{CatalogSource, ImageFetcher, Storage};
pub use crate::utils::error::Result;
