use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};

/// Shared, read-only handle to the storage backend.
pub type ClientHandle = Arc<dyn ObjectStore>;

/// Where the backend is pointed, for the header line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub profile: String,
    pub region: String,
    pub endpoint_url: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to initialise storage client: {0}")]
    Init(String),
    #[error("credentials error: {0}")]
    Credentials(String),
    #[error("no storage client is connected yet")]
    NotConnected,
    #[error("failed to list buckets: {0}")]
    ListContainers(String),
    #[error("failed to list objects in {container}: {message}")]
    ListItems { container: String, message: String },
    #[error("{} already exists; nothing was overwritten", path.display())]
    AlreadyExists { path: PathBuf },
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("object key {key:?} does not map to a path inside the output directory")]
    InvalidKey { key: String },
    #[error("failed to download {key}: {message}")]
    Transfer { key: String, message: String },
}

impl StoreError {
    /// Errors that end the session instead of being dismissible.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Init(_) | StoreError::Credentials(_))
    }
}

/// Operations the browser needs from a storage backend.
pub trait ObjectStore: Send + Sync + fmt::Debug {
    fn identity(&self) -> &Identity;

    fn list_containers(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>>;

    fn list_items<'a>(&'a self, container: &'a str)
    -> BoxFuture<'a, Result<Vec<String>, StoreError>>;

    /// Streams `key` into `destination_dir`, returning the written path.
    fn download<'a>(
        &'a self,
        container: &'a str,
        key: &'a str,
        destination_dir: &'a Path,
    ) -> BoxFuture<'a, Result<PathBuf, StoreError>>;
}

/// Local path an object key is written to.
///
/// Keys containing `/` become nested directories. Absolute keys and keys
/// with `..` components are rejected.
pub fn destination_path(destination_dir: &Path, key: &str) -> Result<PathBuf, StoreError> {
    let relative = Path::new(key);
    let mut has_file = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidKey {
                    key: key.to_string(),
                });
            }
        }
    }
    if !has_file || key.ends_with('/') {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(destination_dir.join(relative))
}

/// Creates the destination file, never touching one that already exists.
pub async fn create_destination(path: &Path) -> Result<File, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => StoreError::Transfer {
                key: path.display().to_string(),
                message: err.to_string(),
            },
        })
}

/// Removes a partially written file after a failed transfer.
pub async fn discard_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), %err, "could not remove partial download");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_keys_become_directories() {
        let path = destination_path(Path::new("/tmp/out"), "logs/2024/app.log").unwrap();
        assert_eq!(path, Path::new("/tmp/out/logs/2024/app.log"));
    }

    #[test]
    fn escaping_keys_are_rejected() {
        for key in ["../secret", "/etc/passwd", "a/../../b", "", "dir/"] {
            let err = destination_path(Path::new("out"), key).unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey { .. }), "key {key:?}");
        }
    }

    #[tokio::test]
    async fn existing_destination_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "keep me").unwrap();

        let err = create_destination(&path).await.unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn missing_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");

        create_destination(&path).await.unwrap();

        assert!(path.is_file());
    }

    #[tokio::test]
    async fn parent_that_is_a_file_reports_create_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), "").unwrap();

        let err = create_destination(&dir.path().join("a/b.txt")).await.unwrap_err();

        assert!(matches!(err, StoreError::CreateDir { .. }));
    }

    #[tokio::test]
    async fn discarding_a_partial_download_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("half.bin");
        let file = create_destination(&path).await.unwrap();
        drop(file);

        discard_partial(&path).await;

        assert!(!path.exists());
        // A second discard only logs.
        discard_partial(&path).await;
    }

    #[test]
    fn only_init_and_credentials_are_fatal() {
        assert!(StoreError::Init("bad".into()).is_fatal());
        assert!(StoreError::Credentials("expired".into()).is_fatal());
        assert!(!StoreError::ListContainers("denied".into()).is_fatal());
        assert!(
            !StoreError::AlreadyExists {
                path: PathBuf::from("x")
            }
            .is_fatal()
        );
    }
}
