//! Filesystem abstraction and native implementation.
//!
//! Provides the [`FileSystem`] trait used for config loading and message
//! downloads, with a native implementation backed by [`tokio::fs`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Platform-agnostic filesystem operations.
///
/// Implementations must create parent directories when writing files.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read a file's entire contents as a UTF-8 string.
    async fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Write a string to a file, creating parent directories if needed.
    ///
    /// Overwrites the file if it already exists.
    async fn write_string(&self, path: &Path, content: &str) -> std::io::Result<()>;

    /// Check whether a path exists (file or directory).
    async fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories.
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Get the user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Native filesystem implementation using [`tokio::fs`].
#[cfg(feature = "native")]
pub struct NativeFileSystem;

#[cfg(feature = "native")]
#[async_trait]
impl FileSystem for NativeFileSystem {
    async fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write_string(&self, path: &Path, content: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_read_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let fs = NativeFileSystem;

        fs.write_string(&path, "hello maila").await.unwrap();
        assert_eq!(fs.read_to_string(&path).await.unwrap(), "hello maila");
    }

    #[tokio::test]
    async fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downloads").join("sid").join("1_hi.html");
        let fs = NativeFileSystem;

        fs.write_string(&path, "<p>hi</p>").await.unwrap();
        assert!(fs.exists(&path).await);
    }

    #[tokio::test]
    async fn write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let fs = NativeFileSystem;

        fs.write_string(&path, "first").await.unwrap();
        fs.write_string(&path, "second").await.unwrap();
        assert_eq!(fs.read_to_string(&path).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn exists_false_for_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!NativeFileSystem.exists(&dir.path().join("nope")).await);
    }

    #[tokio::test]
    async fn create_dir_all_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        NativeFileSystem.create_dir_all(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn read_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = NativeFileSystem
            .read_to_string(&dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
