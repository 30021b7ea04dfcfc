//! Source descriptors and the default documentation catalog.
//!
//! A descriptor pairs a document address with the number of characters kept
//! after extraction. Descriptors are static: they are never persisted.

use crate::{AppConfig, Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Release information, always listed before supplementary material.
const PRIMARY_SOURCES: &[(&str, &str)] = &[
    ("Dart SDK archive", "https://dart.dev/get-dart/archive"),
    ("Flutter release notes", "https://docs.flutter.dev/release/release-notes"),
];

/// Educational material, summarized in this order.
const SUPPLEMENTARY_SOURCES: &[&str] = &[
    "https://www.educative.io/courses/learn-dart-first-step-to-flutter/an-introduction-to-control-structures",
    "https://pub.dev/",
    "https://dart.dev/tutorials",
    "https://dart.dev/language",
    "https://code.makery.ch/library/topic/dart/",
    "https://dart.dev/docs",
    "https://dart.dev/guides",
    "https://dart.dev/guides/language/language-tour",
    "https://docs.flutter.dev/get-started/install",
    "https://docs.flutter.dev/development/ui/widgets-intro",
    "https://docs.flutter.dev/cookbook",
];

/// Named partition of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceGroup {
    /// Primary release information.
    Primary,
    /// Supplementary educational material.
    Supplementary,
}

/// A document to retrieve plus its extraction budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceDescriptor {
    /// Human-readable label used as the section heading.
    pub label: String,
    /// Absolute http(s) address of the document.
    pub url: String,
    pub group: SourceGroup,
    /// Maximum characters kept after text extraction.
    pub budget: usize,
}

impl SourceDescriptor {
    pub fn primary(label: impl Into<String>, url: impl Into<String>, budget: usize) -> Self {
        Self { label: label.into(), url: url.into(), group: SourceGroup::Primary, budget }
    }

    pub fn supplementary(label: impl Into<String>, url: impl Into<String>, budget: usize) -> Self {
        Self { label: label.into(), url: url.into(), group: SourceGroup::Supplementary, budget }
    }
}

/// Build the reference catalog with budgets taken from `config`.
pub fn default_catalog(config: &AppConfig) -> Vec<SourceDescriptor> {
    let primary = PRIMARY_SOURCES
        .iter()
        .map(|(label, url)| SourceDescriptor::primary(*label, *url, config.primary_budget_chars));

    let supplementary = SUPPLEMENTARY_SOURCES
        .iter()
        .map(|url| SourceDescriptor::supplementary(*url, *url, config.supplementary_budget_chars));

    primary.chain(supplementary).collect()
}

/// Reject catalogs that can only produce a misleading result.
///
/// # Errors
///
/// Returns `Error::InvalidConfig` if the catalog is empty, an address is not
/// an absolute http(s) URL with a host, or a budget is zero.
pub fn validate_catalog(descriptors: &[SourceDescriptor]) -> Result<(), Error> {
    if descriptors.is_empty() {
        return Err(Error::InvalidConfig("source catalog is empty".into()));
    }

    for descriptor in descriptors {
        let url = Url::parse(&descriptor.url)
            .map_err(|e| Error::InvalidConfig(format!("source {:?}: {e}", descriptor.url)))?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(Error::InvalidConfig(format!(
                "source {:?}: expected an absolute http(s) address",
                descriptor.url
            )));
        }

        if descriptor.budget == 0 {
            return Err(Error::InvalidConfig(format!("source {:?}: budget must be greater than 0", descriptor.url)));
        }
    }

    Ok(())
}
