// Adapters layer: concrete implementations of the domain ports (catalog API, image fetch, storage).

pub mod http;
pub mod storage;

pub use http::HttpCatalogClient;
pub use storage::LocalStorage;
