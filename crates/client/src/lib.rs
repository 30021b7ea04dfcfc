//! Client code for docctx.
//!
//! This crate provides the HTTP fetch client, markup-to-text extraction, and
//! the orchestrator that turns a source catalog into an aggregated context.

pub mod extract;
pub mod fetch;
pub mod orchestrator;

pub use extract::{ExtractedText, Extractor, MarkupExtractor, collapse_whitespace, truncate_chars};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher};
pub use orchestrator::{
    AggregatedContext, ContextSection, ExtractedDocument, Orchestrator, RunSummary, SourceFailure, SourceOutcome,
    SummaryLimits,
};
