//! Embedding store backed by a remote key-value service.
//!
//! The service exposes two endpoints:
//!
//! - `GET {base}/vectors/{word}` returns `{"word": ..., "vector": [...]}` or 404.
//! - `GET {base}/vectors?single=true&limit=N[&after=W]` returns one page of
//!   `{"entries": [{"word": ..., "vector": [...]}], "next": W | null}`.
//!
//! A full scan walks the pages in key order, one round trip per page, so the
//! ranking never issues per-word lookups.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{EmbeddingError, Result};
use crate::store::{EmbeddingEntry, EmbeddingStore, EntryStream};
use crate::vector::EmbeddingVector;
use crate::word::{Word, is_multiword, normalize_key};

/// Default number of entries fetched per scan page.
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

#[derive(Debug, Deserialize)]
struct RawEntry {
    word: String,
    vector: Value,
}

#[derive(Debug, Deserialize)]
struct Page {
    entries: Vec<RawEntry>,
    #[serde(default)]
    next: Option<String>,
}

/// Remote embedding store.
pub struct RemoteStore {
    /// Base URL of the service.
    base_url: Url,

    /// Bearer token.
    token: Option<String>,

    /// HTTP client.
    client: reqwest::Client,

    /// Entries per scan page.
    page_size: usize,

    /// Expected dimension, if known.
    dimension: Option<usize>,
}

impl RemoteStore {
    /// Create a new remote store.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(EmbeddingError::NotConfigured(format!(
                "store url cannot be a base: {base_url}"
            )));
        }
        // Url::join treats a path without a trailing slash as a file name.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            token: None,
            client: reqwest::Client::new(),
            page_size: DEFAULT_PAGE_SIZE,
            dimension: None,
        })
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the scan page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Declare the dimension every vector must have.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn vectors_url(&self) -> Result<Url> {
        Ok(self.base_url.join("vectors")?)
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.get(url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch_page(&self, after: Option<&str>) -> Result<Page> {
        let mut url = self.vectors_url()?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("single", "true");
            query.append_pair("limit", &self.page_size.to_string());
            if let Some(after) = after {
                query.append_pair("after", after);
            }
        }

        debug!("Fetching vector page after {after:?}");
        let response = self.request(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| EmbeddingError::InvalidResponse(format!("scan page: {e}")))
    }

    /// Turn one raw entry into an admitted entry.
    ///
    /// Returns `None` for multi-word keys.
    fn admit(&self, raw: RawEntry) -> Option<Result<EmbeddingEntry>> {
        let key = normalize_key(&raw.word);
        if is_multiword(&key) {
            return None;
        }
        let word = Word::parse(&key)?;
        let entry = EmbeddingVector::from_json(word.as_str(), &raw.vector).and_then(|vector| {
            if let Some(expected) = self.dimension {
                vector.ensure_dimension(expected)?;
            }
            Ok(EmbeddingEntry::new(word, vector))
        });
        Some(entry)
    }
}

#[async_trait]
impl EmbeddingStore for RemoteStore {
    fn name(&self) -> &str {
        "remote"
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    async fn get(&self, word: &str) -> Result<Option<EmbeddingVector>> {
        let key = normalize_key(word);
        let mut url = self.vectors_url()?;
        url.path_segments_mut()
            .map_err(|()| EmbeddingError::NotConfigured("store url cannot be a base".to_string()))?
            .push(&key);

        let response = self.request(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("No embedding for '{key}'");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let raw: RawEntry = serde_json::from_slice(&bytes)
            .map_err(|e| EmbeddingError::InvalidResponse(format!("lookup '{key}': {e}")))?;
        let vector = EmbeddingVector::from_json(&key, &raw.vector)?;
        if let Some(expected) = self.dimension {
            vector.ensure_dimension(expected)?;
        }
        Ok(Some(vector))
    }

    fn scan_all(&self) -> EntryStream<'_> {
        Box::pin(async_stream::stream! {
            let mut after: Option<String> = None;
            let mut pages = 0usize;
            loop {
                let page = match self.fetch_page(after.as_deref()).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                pages += 1;

                for raw in page.entries {
                    if let Some(item) = self.admit(raw) {
                        yield item;
                    }
                }

                match page.next {
                    Some(next) if after.as_deref() == Some(next.as_str()) => {
                        warn!("Store returned a non-advancing cursor: {next}");
                        yield Err(EmbeddingError::InvalidResponse(format!(
                            "scan cursor did not advance past '{next}'"
                        )));
                        return;
                    }
                    Some(next) => after = Some(next),
                    None => break,
                }
            }
            info!("Scanned {pages} page(s) from remote store");
        })
    }
}
