use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

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

    /// 絕對路徑會直接取代 base_path
    fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        fs::read(&full_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => EtlError::NotFoundError {
                path: full_path.display().to_string(),
            },
            _ => EtlError::IoError(e),
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // 先寫暫存檔再 rename，讀者只會看到舊的或新的完整內容
        let temp_path = temp_sibling(&full_path);
        fs::write(&temp_path, data)?;
        if let Err(e) = fs::rename(&temp_path, &full_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(EtlError::IoError(e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage.read_file("nope/Food.json").await.unwrap_err();
        assert!(matches!(err, EtlError::NotFoundError { .. }));
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("a/b/Food.json", b"first").await.unwrap();
        storage.write_file("a/b/Food.json", b"second").await.unwrap();

        assert_eq!(storage.read_file("a/b/Food.json").await.unwrap(), b"second");
        assert!(!dir.path().join("a/b/Food.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_absolute_path_ignores_base() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("abs.json");
        let storage = LocalStorage::new("/definitely/not/here");

        storage
            .write_file(target.to_str().unwrap(), b"[]")
            .await
            .unwrap();
        assert!(target.exists());
    }
}
