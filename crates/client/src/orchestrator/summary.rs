//! Aggregated context assembly.
//!
//! Folds per-source outcomes into labeled sections, in descriptor order,
//! and renders them as one bounded text document.

use std::fmt;

use docctx_core::{AppConfig, SourceDescriptor, SourceGroup};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::SourceOutcome;
use crate::extract::truncate_chars;

const CONTEXT_HEADING: &str = "# Reference material from official and educational sources";
const SUPPLEMENTARY_HEADING: &str = "## Supplementary resources";
const MAX_TITLE_CHARS: usize = 60;

/// Size limits applied while assembling the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLimits {
    /// Supplementary sections kept, first in list order.
    pub max_supplementary: usize,
    pub primary_section_chars: usize,
    pub supplementary_section_chars: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self { max_supplementary: 8, primary_section_chars: 800, supplementary_section_chars: 600 }
    }
}

impl From<&AppConfig> for SummaryLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_supplementary: config.max_supplementary,
            primary_section_chars: config.primary_section_chars,
            supplementary_section_chars: config.supplementary_section_chars,
        }
    }
}

/// One labeled block of the aggregated context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContextSection {
    pub group: SourceGroup,
    /// Descriptor label for primary sources, page title for supplementary ones.
    pub label: String,
    pub url: String,
    pub text: String,
}

/// A source that could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceFailure {
    pub url: String,
    pub reason: String,
}

/// Counts over every attempted source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    /// Number of sources attempted.
    pub total: u32,
    /// Sources whose content was resolved (fetched or cached).
    pub succeeded: u32,
    /// Subset of `succeeded` served from the cache.
    pub cached: u32,
    /// Sources that failed to resolve.
    pub failed: u32,
    /// Subset of `succeeded` that produced no usable text.
    pub empty: u32,
}

/// Ordered, size-bounded sections built from one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AggregatedContext {
    pub sections: Vec<ContextSection>,
    pub failures: Vec<SourceFailure>,
    pub summary: RunSummary,
}

impl AggregatedContext {
    /// Fold outcomes into sections. `descriptors[i]` produced `outcomes[i]`.
    pub fn assemble(descriptors: &[SourceDescriptor], outcomes: Vec<SourceOutcome>, limits: &SummaryLimits) -> Self {
        let mut context = Self::default();
        let mut supplementary = 0usize;

        for (descriptor, outcome) in descriptors.iter().zip(outcomes) {
            context.summary.total += 1;

            let doc = match outcome {
                SourceOutcome::Succeeded(doc) => doc,
                SourceOutcome::Failed { url, reason } => {
                    context.summary.failed += 1;
                    context.failures.push(SourceFailure { url, reason });
                    continue;
                }
            };

            context.summary.succeeded += 1;
            if doc.from_cache {
                context.summary.cached += 1;
            }
            if doc.text.is_empty() {
                context.summary.empty += 1;
                continue;
            }

            let section = match descriptor.group {
                SourceGroup::Primary => ContextSection {
                    group: SourceGroup::Primary,
                    label: descriptor.label.clone(),
                    url: doc.url,
                    text: truncate_chars(&doc.text, limits.primary_section_chars),
                },
                SourceGroup::Supplementary => {
                    if supplementary >= limits.max_supplementary {
                        continue;
                    }
                    supplementary += 1;
                    let title = doc.title.as_deref().unwrap_or(&descriptor.label);
                    ContextSection {
                        group: SourceGroup::Supplementary,
                        label: truncate_chars(title, MAX_TITLE_CHARS),
                        url: doc.url,
                        text: truncate_chars(&doc.text, limits.supplementary_section_chars),
                    }
                }
            };
            context.sections.push(section);
        }

        context
    }

    /// Render the sections as a single document.
    pub fn render(&self) -> String {
        let mut parts = vec![format!("{CONTEXT_HEADING}\n")];

        for section in self.sections.iter().filter(|s| s.group == SourceGroup::Primary) {
            parts.push(format!("\n## {}\nSource: {}\nContent: {}\n", section.label, section.url, section.text));
        }

        let supplementary: Vec<_> = self.sections.iter().filter(|s| s.group == SourceGroup::Supplementary).collect();
        if !supplementary.is_empty() {
            parts.push(format!("\n{SUPPLEMENTARY_HEADING}\n"));
            for (i, section) in supplementary.iter().enumerate() {
                parts.push(format!(
                    "\n### Resource {}: {}\nURL: {}\nContent: {}\n",
                    i + 1,
                    section.label,
                    section.url,
                    section.text
                ));
            }
        }

        parts.join("\n")
    }
}

impl fmt::Display for AggregatedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
