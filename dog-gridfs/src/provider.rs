use async_trait::async_trait;
use std::time::Duration;

use crate::{ByteStream, ContainerOptions, PresignedUrl, PutData, PutObjectOptions, StorageResult};

/// Container/object storage operations shared by every backend.
///
/// A container is a named group of objects; an object is addressed by
/// `(container, path)`. Backends that lack a capability report it through
/// [`StorageProvider::capabilities`] and return an empty or
/// [`PresignedUrl::Unsupported`] result instead of failing.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Short backend name, e.g. `"gridfs"`
    fn provider(&self) -> &str;

    /// What this backend can actually do
    fn capabilities(&self) -> ProviderCapabilities;

    /// Create a container
    async fn create_container(&self, container: &str, options: ContainerOptions) -> StorageResult<()>;

    /// Delete a container and every object in it
    async fn delete_container(&self, container: &str) -> StorageResult<()>;

    /// Create a container if it doesn't exist yet
    async fn ensure_container(&self, container: &str, options: ContainerOptions) -> StorageResult<()>;

    /// Check whether a container exists
    async fn is_container(&self, container: &str) -> StorageResult<bool>;

    /// List container names
    async fn list_containers(&self) -> StorageResult<Vec<String>>;

    /// Open an object for reading from its first byte
    async fn get_object(&self, container: &str, path: &str) -> StorageResult<ByteStream>;

    /// Store an object, resolving once every byte is committed
    async fn put_object(
        &self,
        container: &str,
        path: &str,
        data: PutData,
        options: PutObjectOptions,
    ) -> StorageResult<()>;

    /// List object names in a container
    async fn list_objects(&self, container: &str, prefix: Option<&str>) -> StorageResult<Vec<String>>;

    /// Delete an object
    async fn delete_object(&self, container: &str, path: &str) -> StorageResult<()>;

    /// URL granting time-limited read access
    async fn presigned_get_url(
        &self,
        container: &str,
        path: &str,
        ttl: Option<Duration>,
    ) -> StorageResult<PresignedUrl>;

    /// URL granting time-limited write access
    async fn presigned_put_url(
        &self,
        container: &str,
        path: &str,
        options: PutObjectOptions,
        ttl: Option<Duration>,
    ) -> StorageResult<PresignedUrl>;
}

/// Provider capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub streaming_uploads: bool,
    pub container_listing: bool,
    pub presigned_urls: bool,
}

impl ProviderCapabilities {
    pub fn basic() -> Self {
        Self {
            streaming_uploads: false,
            container_listing: false,
            presigned_urls: false,
        }
    }

    pub fn with_streaming_uploads(mut self) -> Self {
        self.streaming_uploads = true;
        self
    }
}
