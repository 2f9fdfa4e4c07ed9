use crate::app::ports::{FetchResponse, HttpClientPort};
use crate::common::constants::{
    HTTP_TIMEOUT_SECS, MAX_REDIRECTS, MIME_FONT_SFNT, MIME_FONT_WOFF, MIME_FONT_WOFF2,
    REDIRECT_STATUSES,
};
use crate::common::error::TransportError;
use crate::observability::metrics;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Url};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

/// Transport tuning, normally taken from `Config`.
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub max_redirects: u8,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            max_redirects: MAX_REDIRECTS,
        }
    }
}

pub struct ReqwestHttp {
    client: reqwest::Client,
    settings: HttpSettings,
}

impl Default for ReqwestHttp {
    fn default() -> Self {
        Self::new(HttpSettings::default())
    }
}

impl ReqwestHttp {
    pub fn new(settings: HttpSettings) -> Self {
        // Redirects are followed by hand so the budget and fall-through match our policy.
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self { client, settings }
    }

    #[instrument(skip(self, sink))]
    async fn fetch(
        &self,
        url: &str,
        mut sink: Option<&mut (dyn AsyncWrite + Unpin + Send)>,
    ) -> Result<FetchResponse, TransportError> {
        let mut current = parse_http_url(url)?;
        let mut redirects_left = self.settings.max_redirects;

        let mut resp = loop {
            let resp = self.send(&current).await?;
            let status = resp.status().as_u16();

            if REDIRECT_STATUSES.contains(&status) && redirects_left > 0 {
                let next = resp
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|loc| current.join(loc).ok());
                if let Some(next) = next {
                    redirects_left -= 1;
                    debug!("Following {} redirect to {} ({} left)", status, next, redirects_left);
                    current = next;
                    continue;
                }
            }
            break resp;
        };

        let status = resp.status().as_u16();
        if status != 200 {
            metrics::transport::request_error();
            return Err(TransportError::Status { uri: current.to_string(), status });
        }

        let header_content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut bytes = Vec::new();
        loop {
            let chunk = tokio::time::timeout(self.settings.timeout, resp.chunk())
                .await
                .map_err(|_| {
                    metrics::transport::request_error();
                    TransportError::Timeout { uri: current.to_string() }
                })?
                .map_err(|e| {
                    metrics::transport::request_error();
                    TransportError::Body { uri: current.to_string(), reason: e.to_string() }
                })?;
            let Some(chunk) = chunk else { break };

            if let Some(sink) = sink.as_mut() {
                sink.write_all(&chunk).await.map_err(|e| TransportError::Body {
                    uri: current.to_string(),
                    reason: format!("sink write failed: {}", e),
                })?;
            }
            bytes.extend_from_slice(&chunk);
        }
        if let Some(sink) = sink.as_mut() {
            sink.flush().await.map_err(|e| TransportError::Body {
                uri: current.to_string(),
                reason: format!("sink flush failed: {}", e),
            })?;
        }

        metrics::transport::request_success();
        metrics::transport::payload_bytes(bytes.len());
        debug!("Fetched {} bytes from {}", bytes.len(), current);

        let text = String::from_utf8_lossy(&bytes).into_owned();
        let content_type = sniff_content_type(&bytes).map(|s| s.to_string());
        Ok(FetchResponse {
            status,
            final_url: current.to_string(),
            bytes,
            text,
            content_type,
            header_content_type,
        })
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response, TransportError> {
        let pending = self.client.get(url.clone()).send();
        match tokio::time::timeout(self.settings.timeout, pending).await {
            Err(_) => {
                metrics::transport::request_error();
                Err(TransportError::Timeout { uri: url.to_string() })
            }
            Ok(Err(e)) if e.is_timeout() => {
                metrics::transport::request_error();
                Err(TransportError::Timeout { uri: url.to_string() })
            }
            Ok(Err(e)) => {
                metrics::transport::request_error();
                Err(TransportError::Connection {
                    host: url.host_str().unwrap_or_default().to_string(),
                    reason: e.to_string(),
                })
            }
            Ok(Ok(resp)) => Ok(resp),
        }
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get(&self, url: &str) -> Result<FetchResponse, TransportError> {
        self.fetch(url, None).await
    }

    async fn download(
        &self,
        url: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<FetchResponse, TransportError> {
        self.fetch(url, Some(sink)).await
    }
}

/// Accepts only absolute http(s) URIs with a host.
pub fn parse_http_url(uri: &str) -> Result<Url, TransportError> {
    let invalid = |reason: &str| TransportError::InvalidUri {
        uri: uri.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(uri).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, |h| h.is_empty()) {
        return Err(invalid("missing host"));
    }
    Ok(url)
}

/// Best-effort content type detection from leading magic bytes.
pub fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    let magic = bytes.get(..4)?;
    match magic {
        [0x00, 0x01, 0x00, 0x00] | b"true" | b"OTTO" => Some(MIME_FONT_SFNT),
        b"wOF2" => Some(MIME_FONT_WOFF2),
        b"wOFF" => Some(MIME_FONT_WOFF),
        _ => None,
    }
}
