use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("exports");
        let storage = LocalStorage::new(base.to_string_lossy().into_owned());

        let written = storage.write_file("menu-m1-details.pdf", b"%PDF").await.unwrap();

        assert!(written.ends_with("menu-m1-details.pdf"));
        assert_eq!(std::fs::read(base.join("menu-m1-details.pdf")).unwrap(), b"%PDF");
    }

    #[test]
    fn test_rewrite_replaces_previous_export() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().into_owned());

        tokio_test::block_on(storage.write_file("menu-m1-details.pdf", b"old")).unwrap();
        let written =
            tokio_test::block_on(storage.write_file("menu-m1-details.pdf", b"new")).unwrap();

        assert_eq!(std::fs::read(written).unwrap(), b"new");
    }
}
