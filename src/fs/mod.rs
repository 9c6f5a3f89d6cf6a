/// File system operations abstraction for testing
///
/// The field store reads and writes its JSON file through this trait so that
/// persistence can be exercised against a `mockall` mock in unit tests and
/// against a temporary directory in integration tests.
///
/// # Examples
///
/// ```rust,no_run
/// use dialogue_forge::fs::{FileSystemOperations, StandardFileSystem};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let fs_ops: Arc<dyn FileSystemOperations> = Arc::new(StandardFileSystem);
///
///     fs_ops.write("fields_data.json", b"{}").await?;
///
///     if let Some(contents) = fs_ops.read_to_string("fields_data.json").await? {
///         println!("{contents}");
///     }
///
///     Ok(())
/// }
/// ```
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Read a whole file as UTF-8.
    ///
    /// Returns `Ok(None)` when the file does not exist; every other failure
    /// (permissions, invalid UTF-8, ...) is an error.
    async fn read_to_string(&self, path: &str) -> Result<Option<String>>;

    /// Replace the contents of a file, creating it and its parent directories
    /// if needed.
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &str) -> bool;
}

/// Production implementation backed by `tokio::fs`.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so a crash mid-write leaves either the old or the new contents on disk.
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    async fn read_to_string(&self, path: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {path}")),
        }
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        let target = Path::new(path);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp = temp_path_for(target);
        tokio::fs::write(&tmp, contents)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, target)
            .await
            .with_context(|| format!("Failed to move {} into place", tmp.display()))?;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let result = StandardFileSystem
            .read_to_string(path.to_str().unwrap())
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parents_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fields.json");
        let path_str = path.to_str().unwrap();

        StandardFileSystem.write(path_str, b"{\"a\":1}").await.unwrap();
        StandardFileSystem.write(path_str, b"{}").await.unwrap();

        assert!(StandardFileSystem.exists(path_str));
        assert_eq!(
            StandardFileSystem.read_to_string(path_str).await.unwrap().as_deref(),
            Some("{}")
        );
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_temp_path_is_a_sibling() {
        let tmp = temp_path_for(Path::new("data/fields_data.json"));
        assert_eq!(tmp, PathBuf::from("data/fields_data.json.tmp"));
    }
}
