pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use adapters::{HttpCatalogClient, LocalStorage};
pub use core::{
    aggregator::CatalogAggregator,
    export::{ExportedDocument, Snapshot, SnapshotExporter},
    images::ImageResolver,
    selection::{SelectionRecord, SelectionStore, SharedSelectionStore},
    session::{AggregateResult, CatalogSession, LoadOutcome},
};
pub use utils::error::{CatalogError, FetchTier, Result};
