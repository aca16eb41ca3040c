//! HTTP fetcher
//!
//! Fetches a URL and hands the body to the [`ContentRouter`]:
//! - URL must be absolute (`scheme://host/...`)
//! - Only `200 OK` responses are converted
//! - `Content-Type` must belong to a registered handler (HTML, PDF)
//! - The body streams through the [`SizeGuard`] so an oversize document is
//!   rejected from its `Content-Length` alone, or as soon as it overflows

use std::sync::Arc;

use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::{Config, FetchConfig};
use crate::content::error::ExtractError;
use crate::content::guard::SizeGuard;
use crate::content::pool::{BufferPool, DOCUMENT_BUFFER_CAPACITY};
use crate::content::{ContentRouter, ConversionResult};

const ACCEPT: &str = "text/html,application/xhtml+xml,application/pdf";

/// Fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to fetch URL: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("unsupported content type: {0} (expected HTML or PDF)")]
    UnsupportedContentType(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("conversion failed: {0:#}")]
    Convert(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// HTTP client that converts responses to markdown.
pub struct Fetcher {
    client: Client,
    router: Arc<ContentRouter>,
    guard: SizeGuard,
    bodies: BufferPool<Vec<u8>>,
}

impl Fetcher {
    /// Create a fetcher with the default router for `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let router = Arc::new(ContentRouter::with_config(&config.extract));
        Self::with_router(&config.fetch, SizeGuard::new(config.extract.max_document_bytes), router)
    }

    /// Create a fetcher around an existing router.
    pub fn with_router(
        fetch: &FetchConfig,
        guard: SizeGuard,
        router: Arc<ContentRouter>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(fetch.user_agent.clone())
            .timeout(fetch.timeout())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            router,
            guard,
            bodies: BufferPool::new(DOCUMENT_BUFFER_CAPACITY),
        })
    }

    /// Fetch `raw_url` and convert the body to markdown.
    #[instrument(skip(self))]
    pub async fn fetch_and_convert(&self, raw_url: &str) -> Result<ConversionResult> {
        let url = parse_url(raw_url)?;

        let mut response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let handler = self
            .router
            .handler_for(&content_type)
            .ok_or_else(|| FetchError::UnsupportedContentType(content_type.clone()))?;

        let declared = response.content_length();
        debug!(%content_type, ?declared, limit = self.guard.limit(), "response accepted");

        let mut ingest = self.guard.ingest(declared, &self.bodies)?;
        while let Some(chunk) = response.chunk().await? {
            ingest.push(&chunk)?;
        }
        let body = ingest.finish();
        info!(bytes = body.len(), %content_type, "body received");

        convert_blocking(|| handler.to_markdown(&body, &content_type, Some(&url)))
            .map_err(FetchError::Convert)
    }
}

/// Run a CPU-bound conversion without stalling the tasks queued on this
/// worker. `block_in_place` needs the multi-threaded runtime; elsewhere the
/// closure runs inline.
fn convert_blocking<T>(convert: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(convert),
        _ => convert(),
    }
}

/// Parse and validate an absolute URL.
pub fn parse_url(raw_url: &str) -> Result<Url> {
    let url = Url::parse(raw_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(FetchError::InvalidUrl("missing scheme or host".to_string()));
    }
    Ok(url)
}
