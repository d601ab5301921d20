use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Files under a base directory (the artifacts directory).
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

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = fs::read(self.full_path(path))?;
        Ok(data)
    }

    /// Writes to a sibling temp file and renames it into place, so a failed
    /// write never leaves a partial file behind.
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = full_path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tmp, &full_path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.full_path(path).is_file()
    }

    fn display_path(&self, path: &str) -> String {
        self.full_path(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .write_file("nested/processed_articles.csv", b"a,b\n1,2\n")
            .await
            .unwrap();

        assert!(storage.exists("nested/processed_articles.csv").await);
        assert!(!dir.path().join("nested/processed_articles.csv.tmp").exists());
        assert_eq!(
            storage
                .read_file("nested/processed_articles.csv")
                .await
                .unwrap(),
            b"a,b\n1,2\n"
        );
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory where the output file should go.
        std::fs::create_dir_all(dir.path().join("processed_articles.csv/keep")).unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage
            .write_file("processed_articles.csv", b"a,b\n")
            .await
            .unwrap_err();

        assert!(matches!(err, crate::utils::error::EtlError::IoError(_)));
        assert!(!dir.path().join("processed_articles.csv.tmp").exists());
        assert!(dir.path().join("processed_articles.csv/keep").is_dir());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let err = storage.read_file("raw_articles.csv").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::EtlError::IoError(_)));
        assert!(!storage.exists("raw_articles.csv").await);
    }
}
