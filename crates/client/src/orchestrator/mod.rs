//! Fetch orchestration over the source catalog.
//!
//! ### Per source
//! `PENDING -> (CACHE_HIT | FETCHING) -> (EXTRACTED | FAILED)`
//! - Cache hit: extract from the cached raw markup.
//! - Cache miss: fetch with a timeout, store the raw markup, extract.
//! - A cache read error counts as a miss; a cache write error is logged and
//!   the fetched markup is still used.
//!
//! ### Per run
//! - Primary sources first, then supplementary, each in listed order.
//! - Up to `max_concurrency` sources in flight; results are reassembled by
//!   position, never by completion time.
//! - One source failing never aborts the run. Dropping the `run_all` future
//!   aborts every in-flight fetch.

mod locks;
pub mod summary;

pub use summary::{AggregatedContext, ContextSection, RunSummary, SourceFailure, SummaryLimits};

use std::sync::Arc;
use std::time::Duration;

use docctx_core::cache::hash::compute_cache_key;
use docctx_core::sources::validate_catalog;
use docctx_core::{AppConfig, ContentCache, Error, SourceDescriptor};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::extract::{ExtractedText, Extractor, MarkupExtractor};
use crate::fetch::{FetchClient, FetchConfig, Fetcher};
use locks::AddressLocks;

/// Text extracted from one resolved source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub url: String,
    pub title: Option<String>,
    /// Whitespace-collapsed text within the descriptor's budget. May be empty.
    pub text: String,
    /// Whether the raw markup came from the cache.
    pub from_cache: bool,
}

/// Result of resolving one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Succeeded(ExtractedDocument),
    Failed { url: String, reason: String },
}

/// Retrieves, extracts and aggregates documentation sources.
///
/// Cheap to clone; clones share the cache, fetcher and address locks.
#[derive(Clone)]
pub struct Orchestrator {
    cache: ContentCache,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    locks: Arc<AddressLocks>,
    timeout: Duration,
    max_concurrency: usize,
    limits: SummaryLimits,
}

impl Orchestrator {
    pub fn new(cache: ContentCache, fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            cache,
            fetcher,
            extractor,
            locks: Arc::new(AddressLocks::default()),
            timeout: Duration::from_secs(15),
            max_concurrency: 4,
            limits: SummaryLimits::default(),
        }
    }

    /// Build the production pipeline: HTTP fetcher, markup extractor and the
    /// limits from `config`.
    pub fn from_config(config: &AppConfig, cache: ContentCache) -> Result<Self, Error> {
        let fetcher = FetchClient::new(FetchConfig::from(config))?;
        let extractor = MarkupExtractor::new()?;

        Ok(Self::new(cache, Arc::new(fetcher), Arc::new(extractor))
            .with_timeout(config.timeout())
            .with_max_concurrency(config.max_concurrency)
            .with_limits(SummaryLimits::from(config)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sources fetched at the same time. Values below 1 are treated as 1.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_limits(mut self, limits: SummaryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Resolve and extract one source. Never fails: problems become
    /// `SourceOutcome::Failed`.
    pub async fn fetch_one(&self, descriptor: &SourceDescriptor) -> SourceOutcome {
        let url = descriptor.url.as_str();

        let (raw, from_cache) = {
            let _guard = self.locks.acquire(&compute_cache_key(url)).await;

            match self.cached(url).await {
                Some(raw) => (raw, true),
                None => match self.retrieve(url).await {
                    Ok(raw) => (raw, false),
                    Err(err) => {
                        tracing::warn!(%url, error = %err, "source failed");
                        return SourceOutcome::Failed { url: url.to_string(), reason: err.to_string() };
                    }
                },
            }
        };

        let extracted = self.extractor.extract(&raw, descriptor.budget).unwrap_or_else(|err| {
            tracing::warn!(%url, error = %err, "extraction failed; source contributes no text");
            ExtractedText::default()
        });

        SourceOutcome::Succeeded(ExtractedDocument {
            url: url.to_string(),
            title: extracted.title,
            text: extracted.text,
            from_cache,
        })
    }

    async fn cached(&self, url: &str) -> Option<String> {
        match self.cache.get(url).await {
            Ok(Some(raw)) => {
                tracing::debug!(%url, "cache hit");
                Some(raw)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(%url, error = %err, "cache read failed; refetching");
                None
            }
        }
    }

    async fn retrieve(&self, url: &str) -> Result<String, Error> {
        tracing::debug!(%url, "fetching");

        let raw = tokio::time::timeout(self.timeout, self.fetcher.fetch_text(url))
            .await
            .map_err(|_| Error::FetchTimeout(format!("{url}: no response within {}ms", self.timeout.as_millis())))??;

        if let Err(err) = self.cache.set(url, &raw).await {
            tracing::warn!(%url, error = %err, "cache write failed; continuing with fetched content");
        }

        Ok(raw)
    }

    /// Resolve every descriptor and fold the results into one context.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `descriptors` is empty or malformed.
    /// Individual source failures never produce an error.
    pub async fn run_all(&self, descriptors: &[SourceDescriptor]) -> Result<AggregatedContext, Error> {
        validate_catalog(descriptors)?;

        let mut ordered = descriptors.to_vec();
        ordered.sort_by_key(|d| d.group);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for (index, descriptor) in ordered.iter().cloned().enumerate() {
            let this = self.clone();
            let semaphore = Arc::clone(&semaphore);

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    let reason = "fetch pool closed".to_string();
                    return (index, SourceOutcome::Failed { url: descriptor.url, reason });
                };
                (index, this.fetch_one(&descriptor).await)
            });
        }

        let mut slots: Vec<Option<SourceOutcome>> = (0..ordered.len()).map(|_| None).collect();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(err) => tracing::error!(error = %err, "fetch task did not complete"),
            }
        }

        let outcomes = slots
            .into_iter()
            .zip(&ordered)
            .map(|(slot, descriptor)| {
                slot.unwrap_or_else(|| SourceOutcome::Failed {
                    url: descriptor.url.clone(),
                    reason: "fetch task did not complete".to_string(),
                })
            })
            .collect();

        let context = AggregatedContext::assemble(&ordered, outcomes, &self.limits);
        let summary = context.summary;

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            cached = summary.cached,
            failed = summary.failed,
            empty = summary.empty,
            sections = context.sections.len(),
            "documentation context assembled"
        );

        Ok(context)
    }
}
