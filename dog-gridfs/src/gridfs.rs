use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use futures::TryStreamExt;
use futures_util::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, GridFsErrorKind};
use mongodb::gridfs::GridFsUploadStream;
use tracing::{debug, instrument, warn};

use crate::{
    ByteStream, ConnectionParameters, ContainerOptions, GridFsClient, GridFsConfig, PresignedUrl,
    ProviderCapabilities, PutData, PutObjectOptions, StorageError, StorageProvider, StorageResult,
};

/// Name reported by [`GridFsProvider::provider`]
pub const PROVIDER_NAME: &str = "gridfs";

const FILES_SUFFIX: &str = ".files";

/// Storage provider backed by MongoDB GridFS.
///
/// Each container is a GridFS bucket and each object path is a GridFS
/// filename. Buckets are created by the driver on first write, so the
/// container lifecycle calls are no-ops; presigned URLs and container
/// listing aren't available on this backend.
pub struct GridFsProvider {
    client: GridFsClient,
}

impl GridFsProvider {
    /// Validate the parameters and compile the connection URI. Nothing is
    /// opened until the first storage call.
    pub fn new(params: ConnectionParameters) -> StorageResult<Self> {
        Self::with_config(params, GridFsConfig::default())
    }

    pub fn with_config(params: ConnectionParameters, config: GridFsConfig) -> StorageResult<Self> {
        Ok(Self {
            client: GridFsClient::new(&params, config)?,
        })
    }

    pub fn connection_uri(&self) -> &str {
        self.client.uri()
    }

    pub fn client(&self) -> &GridFsClient {
        &self.client
    }

    /// Filenames of every GridFS bucket in the database
    async fn list_filenames(&self) -> StorageResult<Vec<String>> {
        let db = self.client.database().await?;
        let mut names = Vec::new();

        for collection in db.list_collection_names().await? {
            let Some(bucket_name) = collection.strip_suffix(FILES_SUFFIX) else {
                continue;
            };
            let bucket = self.client.bucket_in(&db, bucket_name);
            let mut cursor = bucket.find(doc! {}).await?;
            while let Some(file) = cursor.try_next().await? {
                if let Some(filename) = file.filename {
                    names.push(filename);
                }
            }
        }

        Ok(names)
    }
}

#[async_trait]
impl StorageProvider for GridFsProvider {
    fn provider(&self) -> &str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::basic().with_streaming_uploads()
    }

    async fn create_container(&self, _container: &str, _options: ContainerOptions) -> StorageResult<()> {
        Ok(())
    }

    #[instrument(skip(self), fields(provider = PROVIDER_NAME))]
    async fn delete_container(&self, container: &str) -> StorageResult<()> {
        let db = self.client.database().await?;

        // drop() on a missing bucket succeeds silently in the driver
        let files = format!("{container}{FILES_SUFFIX}");
        if !db.list_collection_names().await?.contains(&files) {
            return Err(StorageError::backend_message(format!(
                "bucket '{container}' does not exist"
            )));
        }

        self.client.bucket_in(&db, container).drop().await?;
        debug!("bucket dropped");
        Ok(())
    }

    async fn ensure_container(&self, _container: &str, _options: ContainerOptions) -> StorageResult<()> {
        Ok(())
    }

    async fn is_container(&self, _container: &str) -> StorageResult<bool> {
        Ok(true)
    }

    async fn list_containers(&self) -> StorageResult<Vec<String>> {
        Ok(Vec::new())
    }

    #[instrument(skip(self), fields(provider = PROVIDER_NAME))]
    async fn get_object(&self, container: &str, path: &str) -> StorageResult<ByteStream> {
        let bucket = self.client.bucket(container).await?;
        let download = bucket
            .open_download_stream_by_name(path)
            .await
            .map_err(|e| map_download_error(e, container, path))?;

        Ok(download_stream(download, self.client.config().read_buffer_bytes))
    }

    #[instrument(skip(self, data, options), fields(provider = PROVIDER_NAME))]
    async fn put_object(
        &self,
        container: &str,
        path: &str,
        data: PutData,
        options: PutObjectOptions,
    ) -> StorageResult<()> {
        let bucket = self.client.bucket(container).await?;

        let mut open = bucket.open_upload_stream(path);
        if let Some(size) = options.chunk_size_bytes {
            open = open.chunk_size_bytes(size);
        }
        if let Some(metadata) = file_metadata(&options) {
            open = open.metadata(metadata);
        }
        let mut upload = open.await?;

        let mut source = data.into_stream();
        let written = match pipe(&mut source, &mut upload).await {
            Ok(written) => written,
            Err(failure) => {
                abort_upload(&mut upload).await;
                return Err(failure.into());
            }
        };

        upload.close().await.map_err(StorageError::backend)?;
        debug!(bytes = written, "object stored");
        Ok(())
    }

    /// Lists names from every bucket in the database that start with
    /// `container`. `prefix` is accepted but not applied.
    #[instrument(skip(self), fields(provider = PROVIDER_NAME))]
    async fn list_objects(&self, container: &str, prefix: Option<&str>) -> StorageResult<Vec<String>> {
        if prefix.is_some() {
            debug!("prefix filter is not applied by the gridfs provider");
        }
        let names = self.list_filenames().await?;
        Ok(filter_by_container(names, container))
    }

    #[instrument(skip(self), fields(provider = PROVIDER_NAME))]
    async fn delete_object(&self, container: &str, path: &str) -> StorageResult<()> {
        let bucket = self.client.bucket(container).await?;

        let mut cursor = bucket.find(doc! { "filename": path }).await?;
        let mut ids = Vec::new();
        while let Some(file) = cursor.try_next().await? {
            ids.push(file.id);
        }

        // every stored revision of the filename goes
        let ids = require_revisions(ids, container, path)?;
        let revisions = ids.len();
        for id in ids {
            bucket.delete(id).await?;
        }
        debug!(revisions, "object deleted");
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        _container: &str,
        _path: &str,
        _ttl: Option<Duration>,
    ) -> StorageResult<PresignedUrl> {
        Ok(PresignedUrl::Unsupported)
    }

    async fn presigned_put_url(
        &self,
        _container: &str,
        _path: &str,
        _options: PutObjectOptions,
        _ttl: Option<Duration>,
    ) -> StorageResult<PresignedUrl> {
        Ok(PresignedUrl::Unsupported)
    }
}

/// Keep names that start with the container name, sorted and de-duplicated
pub(crate) fn filter_by_container<I>(names: I, container: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names
        .into_iter()
        .filter(|name| name.starts_with(container))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn file_metadata(options: &PutObjectOptions) -> Option<Document> {
    if options.content_type.is_none() && options.metadata.is_empty() {
        return None;
    }

    let mut metadata = Document::new();
    for (key, value) in &options.metadata {
        metadata.insert(key.clone(), value.clone());
    }
    if let Some(content_type) = &options.content_type {
        metadata.insert("contentType", content_type.clone());
    }
    Some(metadata)
}

fn map_download_error(error: mongodb::error::Error, container: &str, path: &str) -> StorageError {
    if matches!(
        *error.kind,
        ErrorKind::GridFs(GridFsErrorKind::FileNotFound { .. })
    ) {
        StorageError::not_found(container, path)
    } else {
        StorageError::backend(error)
    }
}

fn require_revisions<T>(ids: Vec<T>, container: &str, path: &str) -> StorageResult<Vec<T>> {
    if ids.is_empty() {
        return Err(StorageError::not_found(container, path));
    }
    Ok(ids)
}

/// Which side of an upload copy failed
#[derive(Debug)]
enum PipeFailure {
    Source(std::io::Error),
    Sink(std::io::Error),
}

impl From<PipeFailure> for StorageError {
    fn from(failure: PipeFailure) -> Self {
        match failure {
            PipeFailure::Source(e) => StorageError::from(e),
            PipeFailure::Sink(e) => StorageError::backend(e),
        }
    }
}

/// Copy every chunk of `source` into `sink`, returning the byte count
async fn pipe<W>(source: &mut ByteStream, sink: &mut W) -> Result<u64, PipeFailure>
where
    W: AsyncWrite + Unpin,
{
    let mut written: u64 = 0;
    while let Some(chunk) = source.next().await {
        let chunk = chunk.map_err(PipeFailure::Source)?;
        sink.write_all(&chunk).await.map_err(PipeFailure::Sink)?;
        written += chunk.len() as u64;
    }
    Ok(written)
}

async fn abort_upload(upload: &mut GridFsUploadStream) {
    if let Err(e) = upload.abort().await {
        warn!(error = %e, "failed to abort partial upload");
    }
}

/// Read an async reader into `buffer_size` chunks
fn download_stream<R>(reader: R, buffer_size: usize) -> ByteStream
where
    R: AsyncRead + Send + 'static,
{
    let mut reader = Box::pin(reader);
    let stream = async_stream::stream! {
        let mut buf = vec![0u8; buffer_size.max(1)];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => yield Ok::<Bytes, std::io::Error>(Bytes::copy_from_slice(&buf[..n])),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    };
    Box::pin(stream)
}
