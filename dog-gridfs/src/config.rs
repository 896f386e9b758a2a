use std::time::Duration;

/// Client-side tuning for the GridFS provider
#[derive(Debug, Clone)]
pub struct GridFsConfig {
    /// Application name reported to the server in the handshake
    pub app_name: Option<String>,

    /// Overrides the driver's connect timeout when set
    pub connect_timeout: Option<Duration>,

    /// Overrides the driver's server selection timeout when set
    pub server_selection_timeout: Option<Duration>,

    /// Chunk size for new uploads when the put options don't specify one.
    /// `None` keeps the driver default (255 KiB).
    pub chunk_size_bytes: Option<u32>,

    /// Size of each read issued against a download stream
    pub read_buffer_bytes: usize,
}

impl Default for GridFsConfig {
    fn default() -> Self {
        Self {
            app_name: None,
            connect_timeout: None,
            server_selection_timeout: None,
            chunk_size_bytes: None,
            read_buffer_bytes: 64 * 1024, // 64KB
        }
    }
}

impl GridFsConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name
    pub fn with_app_name<S: Into<String>>(mut self, name: S) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Set connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set server selection timeout
    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }

    /// Set default upload chunk size
    pub fn with_chunk_size(mut self, bytes: u32) -> Self {
        self.chunk_size_bytes = Some(bytes);
        self
    }

    /// Set download read buffer size (minimum 1 byte)
    pub fn with_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = GridFsConfig::new()
            .with_app_name("media")
            .with_connect_timeout(Duration::from_secs(2))
            .with_chunk_size(1024)
            .with_read_buffer(0);

        assert_eq!(config.app_name.as_deref(), Some("media"));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.server_selection_timeout, None);
        assert_eq!(config.chunk_size_bytes, Some(1024));
        assert_eq!(config.read_buffer_bytes, 1);
    }
}
