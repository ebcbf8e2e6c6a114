// Lazily loaded, shared dataset.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use super::dataset::Dataset;
use super::loader::{load_dataset, LoadError};

/// Owns the CSV path and the dataset loaded from it.
///
/// The first successful load is cached for the life of the process. A failed
/// load is not cached, so the next request tries the file again.
#[derive(Debug)]
pub struct DataSource {
    path: PathBuf,
    cache: OnceCell<Arc<Dataset>>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DataSource {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    /// A source that is already loaded, for tests and embedding.
    pub fn preloaded(path: impl Into<PathBuf>, dataset: Dataset) -> Self {
        DataSource {
            path: path.into(),
            cache: OnceCell::new_with(Some(Arc::new(dataset))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the dataset, reading the file on a blocking thread if needed.
    pub async fn dataset(&self) -> Result<Arc<Dataset>, LoadError> {
        self.cache
            .get_or_try_init(|| async {
                let path = self.path.clone();
                let dataset = tokio::task::spawn_blocking(move || load_dataset(&path))
                    .await
                    .map_err(|e| LoadError::Task(e.to_string()))??;
                info!(
                    "Loaded {} player rows from {} ({} skipped)",
                    dataset.rows().len(),
                    self.path.display(),
                    dataset.skipped()
                );
                Ok::<_, LoadError>(Arc::new(dataset))
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn loads_once_and_caches() {
        let dir = std::env::temp_dir().join("player_analytics_source_cache");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("players.csv");
        fs::write(&path, "name,year,total_games\nIvanov,2024,10\n").unwrap();

        let source = DataSource::new(&path);
        let first = source.dataset().await.unwrap();
        assert_eq!(first.rows().len(), 1);

        // Changing the file afterwards does not affect the cached dataset.
        fs::write(&path, "name,year,total_games\nA,2024,1\nB,2024,2\n").unwrap();
        let second = source.dataset().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failed_load_is_retried() {
        let dir = std::env::temp_dir().join("player_analytics_source_retry");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("players.csv");

        let source = DataSource::new(&path);
        assert!(matches!(
            source.dataset().await.unwrap_err(),
            LoadError::Io { .. }
        ));

        fs::write(&path, "name,year,total_games\nIvanov,2024,10\n").unwrap();
        let ds = source.dataset().await.unwrap();
        assert_eq!(ds.rows()[0].name, "Ivanov");

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn preloaded_source_skips_file() {
        let source = DataSource::preloaded("missing.csv", Dataset::default());
        assert!(source.dataset().await.unwrap().rows().is_empty());
    }
}
