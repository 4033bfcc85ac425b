//! The JSON store of harvested articles.
//!
//! The store is a single pretty-printed JSON array of [`ArticleRecord`]s,
//! in insertion order. It is read fully at startup and rewritten fully on
//! every save.
//!
//! # Failure Policy
//!
//! - A missing file is an empty store.
//! - An unparsable file is moved aside to the first free `<file>.bak`,
//!   `<file>.bak.1`, ... before starting empty. Earlier backups are never
//!   overwritten.
//! - A file that exists but cannot be read is an error. The caller must not
//!   continue, because the next save would replace it.
//! - Saving writes `<file>.tmp` and renames it over the target, so an
//!   interrupted save leaves the previous contents intact.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::models::ArticleRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store {path} is not a valid article array: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Handle on the store file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record.
    ///
    /// A missing store is empty and a malformed one is set aside. Any other
    /// read failure is returned: saving over a store that could not be read
    /// would drop every record in it.
    #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Vec<ArticleRecord>, StoreError> {
        match self.try_load().await {
            Ok(Some(records)) => {
                info!(count = records.len(), "Loaded existing store");
                Ok(records)
            }
            Ok(None) => {
                info!("No existing store; starting empty");
                Ok(Vec::new())
            }
            Err(e @ StoreError::Json { .. }) => {
                warn!(error = %e, "Store is malformed; starting empty");
                self.set_aside().await?;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn try_load(&self) -> Result<Option<Vec<ArticleRecord>>, StoreError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })
    }

    /// Move the store to the first free `<file>.bak`, `<file>.bak.1`, ...
    async fn set_aside(&self) -> Result<PathBuf, StoreError> {
        let backup = self.free_backup_path().await?;
        fs::rename(&self.path, &backup)
            .await
            .map_err(|source| StoreError::Io {
                path: backup.clone(),
                source,
            })?;
        warn!(backup = %backup.display(), "Moved malformed store aside");
        Ok(backup)
    }

    async fn free_backup_path(&self) -> Result<PathBuf, StoreError> {
        let mut candidate = self.sibling("bak");
        let mut n = 0usize;
        loop {
            let taken = fs::try_exists(&candidate)
                .await
                .map_err(|source| StoreError::Io {
                    path: candidate.clone(),
                    source,
                })?;
            if !taken {
                return Ok(candidate);
            }
            n += 1;
            candidate = self.sibling(&format!("bak.{n}"));
        }
    }

    /// Overwrite the store with `records`.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), count = records.len()))]
    pub async fn save(&self, records: &[ArticleRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.sibling("tmp");
        fs::write(&tmp, json).await.map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        info!("Saved store");
        Ok(())
    }

    fn sibling(&self, extension: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Comment;

    fn temp_store(name: &str) -> Store {
        let path = std::env::temp_dir().join(format!(
            "article_harvest_store_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let store = Store::new(path);
        remove_backups(&store);
        store
    }

    fn remove_backups(store: &Store) {
        let _ = std::fs::remove_file(store.sibling("bak"));
        for n in 1..4 {
            let _ = std::fs::remove_file(store.sibling(&format!("bak.{n}")));
        }
    }

    fn record(url: &str, title: &str) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            title: title.to_string(),
            author: "Иван".to_string(),
            date: "2024-01-01T00:00:00.000Z".to_string(),
            reading_time: Some("3 min".to_string()),
            views: None,
            text_content: "Привет\nмир".to_string(),
            image_content: vec!["a.png".to_string()],
            tags: vec!["rust".to_string()],
            comments: vec![Comment {
                author: "Иван".to_string(),
                text: "Спасибо".to_string(),
            }],
            comments_from_author: vec![Comment {
                author: "Иван".to_string(),
                text: "Спасибо".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_missing_store_loads_empty() {
        let store = temp_store("missing");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_store_loads_empty_and_is_set_aside() {
        let store = temp_store("malformed");
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().await.unwrap().is_empty());
        assert!(!store.path().exists());
        let backup = format!("{}.bak", store.path().display());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "{ not json");
        std::fs::remove_file(backup).unwrap();
    }

    #[tokio::test]
    async fn test_repeated_malformed_stores_keep_every_backup() {
        let store = temp_store("malformed_twice");

        std::fs::write(store.path(), "first-user-data [").unwrap();
        assert!(store.load().await.unwrap().is_empty());
        std::fs::write(store.path(), "second-garbage {").unwrap();
        assert!(store.load().await.unwrap().is_empty());

        assert_eq!(
            std::fs::read_to_string(store.sibling("bak")).unwrap(),
            "first-user-data ["
        );
        assert_eq!(
            std::fs::read_to_string(store.sibling("bak.1")).unwrap(),
            "second-garbage {"
        );
        assert!(!store.path().exists());
        remove_backups(&store);
    }

    #[tokio::test]
    async fn test_unreadable_store_is_an_error_and_left_in_place() {
        // A directory at the store path fails to read with something other
        // than NotFound, even when running as root.
        let store = temp_store("unreadable");
        let _ = std::fs::remove_dir_all(store.path());
        std::fs::create_dir(store.path()).unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "{err:?}");
        assert!(store.path().is_dir());
        assert!(!store.sibling("bak").exists());
        std::fs::remove_dir(store.path()).unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order_and_values() {
        let store = temp_store("round_trip");
        let records = vec![
            record("https://example.com/b", "B"),
            record("https://example.com/a", "A"),
        ];
        store.save(&records).await.unwrap();
        let first = std::fs::read_to_string(store.path()).unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, records);

        store.save(&loaded).await.unwrap();
        let second = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(first, second);
        std::fs::remove_file(store.path()).unwrap();
    }

    #[tokio::test]
    async fn test_save_is_pretty_and_keeps_non_ascii() {
        let store = temp_store("pretty");
        store.save(&[record("https://example.com/x", "Заголовок")]).await.unwrap();
        let text = std::fs::read_to_string(store.path()).unwrap();

        assert!(text.starts_with("[\n  {\n    \"url\""));
        assert!(text.contains("Заголовок"));
        assert!(!text.contains("\\u"));
        std::fs::remove_file(store.path()).unwrap();
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = temp_store("overwrite");
        store.save(&[record("https://example.com/1", "1")]).await.unwrap();
        store.save(&[]).await.unwrap();
        assert!(store.load().await.unwrap().is_empty());
        std::fs::remove_file(store.path()).unwrap();
    }
}
