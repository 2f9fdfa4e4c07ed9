use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWrite;

use crate::common::error::{Result, TransportError};

/// Outcome of a successful (status 200) GET, after redirects.
#[derive(Clone, Debug)]
pub struct FetchResponse {
    pub status: u16,
    pub final_url: String,
    pub bytes: Vec<u8>,
    /// Body decoded as UTF-8 (lossy)
    pub text: String,
    /// Sniffed from the body; `None` when the bytes are not recognised
    pub content_type: Option<String>,
    /// As declared by the server
    pub header_content_type: Option<String>,
}

// Retrieval transport
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get(&self, url: &str) -> std::result::Result<FetchResponse, TransportError>;

    /// Same as `get`, additionally streaming every body chunk into `sink`
    /// as it arrives.
    async fn download(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> std::result::Result<FetchResponse, TransportError>;
}

// OS font registration
#[async_trait]
pub trait FontRegistrarPort: Send + Sync {
    /// Directory that system installs are placed into
    fn fonts_dir(&self) -> Option<PathBuf>;

    /// Make an already-placed font file known to the OS.
    async fn register(&self, path: &Path) -> Result<()>;
}
