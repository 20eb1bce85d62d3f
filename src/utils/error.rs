use std::fmt;
use thiserror::Error;

/// Which level of the catalog hierarchy a fetch targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchTier {
    Menu,
    Category,
    Product,
    Image,
}

impl fmt::Display for FetchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchTier::Menu => "menu",
            FetchTier::Category => "category",
            FetchTier::Product => "product",
            FetchTier::Image => "image",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Required identifier missing: {field}")]
    PreconditionMissing { field: String },

    #[error("Failed to fetch {tier}: {reason}")]
    FetchFailed { tier: FetchTier, reason: String },

    #[error("Could not embed image '{reference}': {reason}")]
    ExportResolutionFailed { reference: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Export,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CatalogError {
    pub fn fetch(tier: FetchTier, reason: impl Into<String>) -> Self {
        CatalogError::FetchFailed {
            tier,
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::PreconditionMissing { .. } => ErrorCategory::Input,
            CatalogError::FetchFailed { .. } => ErrorCategory::Network,
            CatalogError::ExportResolutionFailed { .. } => ErrorCategory::Export,
            CatalogError::IoError(_) | CatalogError::SerializationError(_) => {
                ErrorCategory::System
            }
            CatalogError::ConfigError { .. }
            | CatalogError::ConfigValidationError { .. }
            | CatalogError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // absorbed locally; a placeholder takes the image's place
            CatalogError::ExportResolutionFailed { .. } => ErrorSeverity::Low,
            CatalogError::FetchFailed { .. } => ErrorSeverity::Medium,
            CatalogError::PreconditionMissing { .. }
            | CatalogError::ConfigError { .. }
            | CatalogError::ConfigValidationError { .. }
            | CatalogError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            CatalogError::IoError(_) | CatalogError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Message suitable for the content area that replaces the catalog on failure.
    pub fn user_friendly_message(&self) -> String {
        match self {
            CatalogError::PreconditionMissing { field } => {
                format!("No {} was provided. Check the link or QR code you followed.", field)
            }
            CatalogError::FetchFailed { tier, .. } => match tier {
                FetchTier::Menu => "Failed to fetch menu".to_string(),
                FetchTier::Category => "Failed to fetch categories".to_string(),
                FetchTier::Product => "Failed to fetch products".to_string(),
                FetchTier::Image => "Failed to fetch image".to_string(),
            },
            CatalogError::ExportResolutionFailed { reference, .. } => {
                format!("Image '{}' could not be included in the export", reference)
            }
            CatalogError::IoError(e) => format!("File operation failed: {}", e),
            CatalogError::SerializationError(e) => format!("Unexpected data format: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Open the menu again from a valid link",
            ErrorCategory::Network => "Check that the catalog backend is running and reachable",
            ErrorCategory::Export => "Check the media origin setting and the image references",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
