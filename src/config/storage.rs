use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem-backed dataset cache rooted at a base directory (the
/// working directory locally, `/tmp` on the serverless platform).
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.resolve(name).exists())
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(name);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    fn resolve(&self, name: &str) -> PathBuf {
        Path::new(&self.base_path).join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_contains() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        assert!(!storage.contains("map.gpkg").await.unwrap());
        storage.write_file("map.gpkg", b"payload").await.unwrap();
        assert!(storage.contains("map.gpkg").await.unwrap());

        let written = fs::read(storage.resolve("map.gpkg")).unwrap();
        assert_eq!(written, b"payload");
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested").join("cache"));

        storage.write_file("map.gpkg", b"x").await.unwrap();
        assert!(storage.resolve("map.gpkg").exists());
    }
}
