//! Object storage for task and profile photos.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use futures::future::try_join_all;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid object name {0:?}")]
    InvalidName(String),
}

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, name: &str, bytes: Bytes) -> Result<(), StorageError>;
    async fn get(&self, name: &str) -> Result<Option<Bytes>, StorageError>;
    /// Removing an absent object is not an error.
    async fn remove(&self, name: &str) -> Result<(), StorageError>;
    fn url_for(&self, name: &str) -> String;
    /// Object name behind a URL produced by [`ObjectStore::url_for`].
    fn name_from_url(&self, url: &str) -> Option<String>;
}

/// Unique object name keeping a readable trace of the uploaded file name.
pub fn object_name(original: &str) -> String {
    let cleaned: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = if cleaned.is_empty() { "file" } else { cleaned };
    format!("{}-{}", Uuid::new_v4(), cleaned)
}

/// Uploads every file and returns their public URLs in input order.
pub async fn upload_all(
    store: &dyn ObjectStore,
    files: &[UploadedFile],
) -> Result<Vec<String>, StorageError> {
    let uploads = files.iter().map(|file| async move {
        let name = object_name(&file.file_name);
        store.put(&name, file.bytes.clone()).await?;
        Ok::<_, StorageError>(store.url_for(&name))
    });
    try_join_all(uploads).await
}

/// Removes the objects behind `urls`. URLs not pointing into the store are
/// skipped.
pub async fn remove_urls(store: &dyn ObjectStore, urls: &[String]) -> Result<(), StorageError> {
    let names: Vec<String> = urls
        .iter()
        .filter_map(|url| store.name_from_url(url))
        .collect();
    try_join_all(names.iter().map(|name| store.remove(name))).await?;
    Ok(())
}

/// Objects kept as files in one directory and published under
/// `{public_url}/files/{name}`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    public_url: String,
}

impl FsObjectStore {
    pub async fn open(
        root: impl Into<PathBuf>,
        public_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(FsObjectStore {
            root,
            public_url: public_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidName(name.to_owned()));
        }
        Ok(self.root.join(name))
    }

    fn url_prefix(&self) -> String {
        format!("{}/files/", self.public_url)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, name: &str, bytes: Bytes) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        tokio::fs::write(path, &bytes).await?;
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Bytes>, StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}{}", self.url_prefix(), name)
    }

    fn name_from_url(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(&self.url_prefix())?;
        let name = rest.split(['?', '#']).next().unwrap_or_default();
        if name.is_empty() {
            None
        } else {
            Some(name.to_owned())
        }
    }
}
