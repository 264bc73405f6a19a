use crate::domain::ports::{SnapshotPath, SnapshotSource};
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads snapshots from a local mirror of the file host.
///
/// Layout: `<base>/telegram/<COMMUNITY>/<file>` and `<base>/discord/<file>`.
#[derive(Debug, Clone)]
pub struct LocalSource {
    base_path: PathBuf,
}

impl LocalSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn full_path(&self, path: &SnapshotPath) -> PathBuf {
        Path::new(&self.base_path)
            .join(path.platform.as_str())
            .join(&path.path)
    }
}

#[async_trait]
impl SnapshotSource for LocalSource {
    async fn fetch(&self, path: &SnapshotPath) -> Result<Vec<u8>> {
        let full_path = self.full_path(path);
        match tokio::fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DashboardError::NotFound {
                resource: full_path.display().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Platform;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_mirrored_layout() {
        let temp_dir = TempDir::new().unwrap();
        let community_dir = temp_dir.path().join("telegram").join("SODEX");
        std::fs::create_dir_all(&community_dir).unwrap();
        std::fs::write(community_dir.join("mar3_processed.json"), b"{}").unwrap();

        let source = LocalSource::new(temp_dir.path());
        let data = source
            .fetch(&SnapshotPath::new(Platform::Telegram, "SODEX/mar3_processed.json"))
            .await
            .unwrap();

        assert_eq!(data, b"{}".to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let source = LocalSource::new(temp_dir.path());

        let err = source
            .fetch(&SnapshotPath::new(Platform::Discord, "mar3.json"))
            .await
            .unwrap_err();

        assert!(matches!(err, DashboardError::NotFound { .. }));
    }
}
