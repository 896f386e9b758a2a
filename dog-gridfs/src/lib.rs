//! # dog-gridfs: GridFS storage provider
//!
//! `dog-gridfs` puts MongoDB GridFS behind the generic [`StorageProvider`]
//! interface used by DogRS storage backends: containers, streaming objects and
//! presigned URLs. Containers map 1:1 to GridFS buckets and object paths to
//! GridFS filenames.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dog_gridfs::prelude::*;
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() -> StorageResult<()> {
//! // 1. Describe the connection; nothing is opened yet
//! let params = ConnectionParameters::new("files")
//!     .with_server("db1:27017")
//!     .with_auth("alice", "secret");
//! let storage = GridFsProvider::new(params)?;
//!
//! // 2. Store an object (the bucket is created on first write)
//! storage
//!     .put_object("photos", "cat.txt", "meow".into(), PutObjectOptions::new())
//!     .await?;
//!
//! // 3. Stream it back
//! let mut body = storage.get_object("photos", "cat.txt").await?;
//! while let Some(chunk) = body.next().await {
//!     let _bytes = chunk?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │   Your Service       │  ← talks to dyn StorageProvider
//! ├──────────────────────┤
//! │   GridFsProvider     │  ← containers/objects → buckets/files
//! ├──────────────────────┤
//! │   GridFsClient       │  ← compiled URI + lazily opened client
//! ├──────────────────────┤
//! │   mongodb driver     │
//! └──────────────────────┘
//! ```
//!
//! Capabilities GridFS lacks (presigned URLs, container listing) never fail:
//! they return [`PresignedUrl::Unsupported`] or an empty list, and
//! [`StorageProvider::capabilities`] says so up front.

mod client;
mod config;
mod error;
mod gridfs;
mod params;
mod provider;
mod types;
mod uri;

// Re-export main types for clean API
pub use client::GridFsClient;
pub use config::GridFsConfig;
pub use error::{StorageError, StorageResult};
pub use gridfs::{GridFsProvider, PROVIDER_NAME};
pub use params::{Auth, ConnectionOptions, ConnectionParameters};
pub use provider::{ProviderCapabilities, StorageProvider};
pub use types::{ByteStream, ContainerOptions, PresignedUrl, PutData, PutObjectOptions};
pub use uri::{make_uri, SCHEME};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ByteStream, ConnectionParameters, GridFsProvider, PresignedUrl, PutData,
        PutObjectOptions, StorageError, StorageProvider, StorageResult,
    };
}
