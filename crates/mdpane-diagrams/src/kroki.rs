//! Mermaid rendering through a Kroki server.
//!
//! Sources are validated locally first: a block without a known diagram type
//! fails without a request. Valid blocks are POSTed to
//! `{kroki_url}/mermaid/svg` on a blocking thread and the SVG is cached by
//! content hash.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ureq::Agent;

use crate::cache::{DiagramCache, DiagramKey, MemoryCache};
use crate::consts::{DEFAULT_TIMEOUT, MERMAID_ENDPOINT, SVG_FORMAT};
use crate::error::DiagramError;
use crate::extract::DiagramBlock;
use crate::renderer::DiagramRenderer;
use crate::syntax;

/// Create HTTP agent with the specified timeout.
///
/// Status codes are inspected by the caller so error bodies can be reported.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`DiagramRenderer`] backed by a Kroki server.
pub struct KrokiRenderer {
    server_url: Option<String>,
    agent: Agent,
    cache: Arc<dyn DiagramCache>,
}

impl KrokiRenderer {
    /// Create a renderer for `server_url`.
    ///
    /// With `None`, valid diagrams fail with [`DiagramError::Disabled`].
    #[must_use]
    pub fn new(server_url: Option<String>) -> Self {
        Self {
            server_url: server_url.map(|url| url.trim_end_matches('/').to_owned()),
            agent: create_agent(DEFAULT_TIMEOUT),
            cache: Arc::new(MemoryCache::new()),
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Use a specific cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn DiagramCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Configured server URL, without trailing slash.
    #[must_use]
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }
}

impl std::fmt::Debug for KrokiRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrokiRenderer")
            .field("server_url", &self.server_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DiagramRenderer for KrokiRenderer {
    async fn render(&self, block: &DiagramBlock) -> Result<String, DiagramError> {
        if syntax::detect_kind(&block.source).is_none() {
            return Err(DiagramError::UnknownKind {
                kind: block.declared_kind.clone(),
            });
        }

        let Some(server_url) = &self.server_url else {
            return Err(DiagramError::Disabled);
        };

        let key = DiagramKey {
            source: &block.source,
            endpoint: MERMAID_ENDPOINT,
            format: SVG_FORMAT,
        };
        if let Some(svg) = self.cache.get(key) {
            tracing::debug!(id = block.id, "Diagram cache hit");
            return Ok(svg);
        }

        let agent = self.agent.clone();
        let url = format!("{server_url}/{MERMAID_ENDPOINT}/{SVG_FORMAT}");
        let source = block.source.clone();
        let svg = tokio::task::spawn_blocking(move || send_diagram_request(&agent, &url, &source))
            .await
            .map_err(|e| DiagramError::Task(e.to_string()))??;

        self.cache.set(key, &svg);
        Ok(svg)
    }
}

/// Send a diagram to Kroki and return the response body.
///
/// Handles HTTP errors by reading the response body for error details.
fn send_diagram_request(agent: &Agent, url: &str, source: &str) -> Result<String, DiagramError> {
    let response = agent
        .post(url)
        .header("Content-Type", "text/plain")
        .send(source.as_bytes())
        .map_err(|e| DiagramError::Http(e.to_string()))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(DiagramError::Http(format!(
            "HTTP {status}: {}",
            error_body.trim()
        )));
    }

    body.read_to_string()
        .map_err(|e| DiagramError::Io(e.to_string()))
}
