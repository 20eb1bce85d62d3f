use crate::utils::error::{CatalogError, Result};
use url::Url;

/// Turns a stored photo reference into a fetchable URL.
///
/// Absolute http(s) references are used as they are; anything else is a
/// path below the media origin.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    media_origin: String,
}

impl ImageResolver {
    pub fn new(media_origin: &str) -> Self {
        Self {
            media_origin: media_origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn resolve(&self, reference: &str) -> Result<Url> {
        let reference = reference.trim();
        let failed = |reason: String| CatalogError::ExportResolutionFailed {
            reference: reference.to_string(),
            reason,
        };

        if reference.is_empty() {
            return Err(failed("empty image reference".to_string()));
        }

        if let Ok(url) = Url::parse(reference) {
            return match url.scheme() {
                "http" | "https" => Ok(url),
                scheme => Err(failed(format!("unsupported scheme '{}'", scheme))),
            };
        }

        let joined = format!("{}/{}", self.media_origin, reference.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| failed(e.to_string()))
    }
}
