use bytes::Bytes;
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;

use crate::{StorageError, StorageResult};

/// Stream of bytes for object content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Content accepted by `put_object`: a byte buffer, a string, or a stream
pub enum PutData {
    Bytes(Bytes),
    Text(String),
    Stream(ByteStream),
}

impl PutData {
    /// Turn the data into a stream. Buffers and strings become a single chunk.
    pub fn into_stream(self) -> ByteStream {
        match self {
            PutData::Stream(stream) => stream,
            PutData::Bytes(bytes) => single_chunk(bytes),
            PutData::Text(text) => single_chunk(Bytes::from(text)),
        }
    }
}

fn single_chunk(bytes: Bytes) -> ByteStream {
    Box::pin(futures_util::stream::once(async move {
        Ok::<_, std::io::Error>(bytes)
    }))
}

impl fmt::Debug for PutData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutData::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            PutData::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            PutData::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for PutData {
    fn from(bytes: Bytes) -> Self {
        PutData::Bytes(bytes)
    }
}

impl From<Vec<u8>> for PutData {
    fn from(bytes: Vec<u8>) -> Self {
        PutData::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for PutData {
    fn from(bytes: &'static [u8]) -> Self {
        PutData::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for PutData {
    fn from(text: String) -> Self {
        PutData::Text(text)
    }
}

impl From<&str> for PutData {
    fn from(text: &str) -> Self {
        PutData::Text(text.to_string())
    }
}

impl From<ByteStream> for PutData {
    fn from(stream: ByteStream) -> Self {
        PutData::Stream(stream)
    }
}

/// Loosely typed input: a string, or an array of byte values.
impl TryFrom<Value> for PutData {
    type Error = StorageError;

    fn try_from(value: Value) -> StorageResult<Self> {
        match value {
            Value::String(text) => Ok(PutData::Text(text)),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(PutData::from)
                .ok_or_else(invalid_data),
            _ => Err(invalid_data()),
        }
    }
}

fn invalid_data() -> StorageError {
    StorageError::invalid("Invalid data argument: must be a stream, a byte buffer or a string")
}

/// Options for `put_object`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutObjectOptions {
    pub content_type: Option<String>,
    pub metadata: BTreeMap<String, String>,
    /// Overrides the provider's default chunk size for this upload
    pub chunk_size_bytes: Option<u32>,
}

impl PutObjectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_chunk_size(mut self, bytes: u32) -> Self {
        self.chunk_size_bytes = Some(bytes);
        self
    }
}

/// Options for `create_container` / `ensure_container`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerOptions {
    pub chunk_size_bytes: Option<u32>,
}

/// Outcome of a presigned URL request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresignedUrl {
    /// Signed URL and its expiry as a unix timestamp, for backends that sign
    Url { url: String, expires_at: i64 },
    /// The backend cannot sign URLs
    Unsupported,
}

impl PresignedUrl {
    pub fn is_supported(&self) -> bool {
        matches!(self, PresignedUrl::Url { .. })
    }

    /// The URL, or `""` when unsupported
    pub fn as_str(&self) -> &str {
        match self {
            PresignedUrl::Url { url, .. } => url,
            PresignedUrl::Unsupported => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;

    async fn collect(data: PutData) -> Vec<Bytes> {
        data.into_stream()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await
    }

    #[test]
    fn numbers_are_not_put_data() {
        let err = PutData::try_from(json!(42)).unwrap_err();
        assert!(matches!(err, StorageError::Invalid { .. }));

        assert!(PutData::try_from(json!({ "a": 1 })).is_err());
        assert!(PutData::try_from(json!([1, 2, 256])).is_err());
        assert!(PutData::try_from(Value::Null).is_err());
    }

    #[test]
    fn strings_and_byte_arrays_are_put_data() {
        assert!(matches!(PutData::try_from(json!("hi")).unwrap(), PutData::Text(t) if t == "hi"));
        assert!(matches!(
            PutData::try_from(json!([104, 105])).unwrap(),
            PutData::Bytes(b) if &b[..] == b"hi"
        ));
    }

    #[tokio::test]
    async fn buffers_become_a_single_chunk() {
        assert_eq!(collect(PutData::from("hello")).await, vec![Bytes::from("hello")]);
        assert_eq!(collect(PutData::from(vec![1u8, 2, 3])).await, vec![Bytes::from(vec![1u8, 2, 3])]);
    }

    #[tokio::test]
    async fn streams_pass_through() {
        let chunks: Vec<Result<Bytes, std::io::Error>> =
            vec![Ok(Bytes::from("a")), Ok(Bytes::from("b"))];
        let stream: ByteStream = Box::pin(futures_util::stream::iter(chunks));
        let data = PutData::from(stream);
        assert!(matches!(data, PutData::Stream(_)));
        assert_eq!(collect(data).await, vec![Bytes::from("a"), Bytes::from("b")]);
    }

    #[test]
    fn unsupported_presigned_url_is_empty() {
        let url = PresignedUrl::Unsupported;
        assert!(!url.is_supported());
        assert_eq!(url.as_str(), "");
    }

    #[test]
    fn signed_url_exposes_its_address() {
        let url = PresignedUrl::Url {
            url: "https://files.example/cat.jpg?sig=abc".to_string(),
            expires_at: 1_700_000_000,
        };
        assert!(url.is_supported());
        assert_eq!(url.as_str(), "https://files.example/cat.jpg?sig=abc");
    }
}
