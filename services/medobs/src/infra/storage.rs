use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;

use crate::domain::repository::MediaStorage;
use crate::error::MedobsError;

/// Stores uploads on the local filesystem under `root`.
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    pub root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a relative media path, refusing anything that escapes the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, MedobsError> {
        let relative = Path::new(path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(MedobsError::InvalidFile);
        }
        Ok(self.root.join(relative))
    }
}

impl MediaStorage for LocalMediaStorage {
    async fn save(&self, path: &str, contents: &[u8]) -> Result<(), MedobsError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create media directory {}", parent.display()))?;
        }
        tokio::fs::write(&full, contents)
            .await
            .with_context(|| format!("write media file {}", full.display()))?;
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Option<Vec<u8>>, MedobsError> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read media file {}", full.display()))
                .into()),
        }
    }
}
