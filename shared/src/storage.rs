//! Persisted last-selected-project storage.
//!
//! Provides the `SlugStore` trait for abstracting where the last
//! selected project slug lives, with an in-memory implementation for
//! tests and a file-backed one for the CLI. This is the console's
//! analog of a single `localStorage` key.

use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

/// Errors that can occur during slug store operations.
#[derive(Debug, Error)]
pub enum SlugStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on slug store")]
    LockError,

    /// Failed to read or write the backing file.
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Abstraction over the persisted last-selected project slug.
pub trait SlugStore {
    /// Loads the persisted slug, if any.
    fn load(&self) -> Option<String>;

    /// Persists the slug.
    ///
    /// # Errors
    ///
    /// Returns a `SlugStoreError` if the backing storage cannot be
    /// written.
    fn save(&self, slug: &str) -> Result<(), SlugStoreError>;
}

/// In-memory slug store for development and testing.
#[derive(Debug, Default)]
pub struct InMemorySlugStore {
    slug: RwLock<Option<String>>,
}

impl InMemorySlugStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a slug.
    #[must_use]
    pub fn with_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: RwLock::new(Some(slug.into())),
        }
    }
}

impl SlugStore for InMemorySlugStore {
    fn load(&self) -> Option<String> {
        self.slug.read().ok()?.clone()
    }

    fn save(&self, slug: &str) -> Result<(), SlugStoreError> {
        let mut guard = self.slug.write().map_err(|_| SlugStoreError::LockError)?;
        *guard = Some(slug.to_string());
        Ok(())
    }
}

/// File-backed slug store: one slug on one line.
#[derive(Debug, Clone)]
pub struct FileSlugStore {
    path: PathBuf,
}

impl FileSlugStore {
    /// Creates a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SlugStore for FileSlugStore {
    fn load(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let slug = contents.trim();
        if slug.is_empty() {
            None
        } else {
            Some(slug.to_string())
        }
    }

    fn save(&self, slug: &str) -> Result<(), SlugStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, format!("{slug}\n"))?;
        Ok(())
    }
}
