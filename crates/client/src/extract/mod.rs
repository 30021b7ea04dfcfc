//! Plain-text extraction from HTML markup.
//!
//! ### Algorithm
//! - Parse with html5ever (via `scraper`), which recovers from malformed input.
//! - Drop non-content subtrees: scripts, styles, navigation, header/footer.
//! - Join the remaining text nodes, collapse every whitespace run to a single
//!   space, then truncate to the character budget.
//!
//! ### Stable Abstraction
//! - The `Extractor` trait decouples the orchestrator from the parser.

use docctx_core::Error;
use scraper::{ElementRef, Html, Selector};

/// Elements whose text never reaches the output.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "nav", "header", "footer"];

/// Result of text extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// Document `<title>`, whitespace-collapsed
    pub title: Option<String>,
    /// Whitespace-collapsed text, at most `budget` characters
    pub text: String,
}

/// Stable extractor trait for content extraction.
pub trait Extractor: Send + Sync {
    /// Extract readable text from HTML, keeping at most `budget` characters.
    fn extract(&self, html: &str, budget: usize) -> Result<ExtractedText, Error>;
}

/// `scraper`-based extractor implementation.
#[derive(Debug)]
pub struct MarkupExtractor {
    title: Selector,
}

impl MarkupExtractor {
    pub fn new() -> Result<Self, Error> {
        let title = Selector::parse("title").map_err(|e| Error::ExtractFailed(format!("invalid selector: {e}")))?;
        Ok(Self { title })
    }
}

impl Extractor for MarkupExtractor {
    fn extract(&self, html: &str, budget: usize) -> Result<ExtractedText, Error> {
        if html.trim().is_empty() {
            return Ok(ExtractedText::default());
        }

        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        let mut chunks = Vec::new();
        collect_text(document.root_element(), &mut chunks);

        let text = truncate_chars(&collapse_whitespace(&chunks.join(" ")), budget);

        Ok(ExtractedText { title, text })
    }
}

fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(&**text);
        } else if let Some(child) = ElementRef::wrap(child)
            && !SKIPPED_ELEMENTS.contains(&child.value().name())
        {
            collect_text(child, out);
        }
    }
}

/// Replace every run of whitespace (including newlines) with one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str, budget: usize) -> ExtractedText {
        MarkupExtractor::new().unwrap().extract(html, budget).unwrap()
    }

    #[test]
    fn test_strips_scripts_and_collapses_whitespace() {
        let result = extract("<script>dangerous()</script><p>Hello   world</p>", 5000);
        assert_eq!(result.text, "Hello world");
    }

    #[test]
    fn test_strips_structural_regions() {
        let html = r#"
            <html>
            <head><title>Docs</title><style>p { color: red }</style></head>
            <body>
                <header>Site header</header>
                <nav><a href="/">Home</a></nav>
                <main>
                    <h1>Control   flow</h1>
                    <p>Use <code>if</code>
                       and <code>else</code>.</p>
                </main>
                <footer>Copyright</footer>
            </body>
            </html>
        "#;

        let result = extract(html, 5000);
        assert_eq!(result.title.as_deref(), Some("Docs"));
        assert_eq!(result.text, "Docs Control flow Use if and else .");
        assert!(!result.text.contains("Site header"));
        assert!(!result.text.contains("Home"));
        assert!(!result.text.contains("Copyright"));
        assert!(!result.text.contains("color"));
    }

    #[test]
    fn test_truncates_to_budget() {
        let result = extract("<p>Hello world, this is long</p>", 10);
        assert_eq!(result.text, "Hello worl");
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let result = extract("<p>ÄÖÜ äöü</p>", 5);
        assert_eq!(result.text, "ÄÖÜ ä");
    }

    #[test]
    fn test_empty_input() {
        let result = extract("   ", 100);
        assert_eq!(result, ExtractedText::default());
    }

    #[test]
    fn test_malformed_markup_is_recovered() {
        let result = extract("<div><p>unclosed <b>bold</div></span>", 100);
        assert_eq!(result.text, "unclosed bold");
        assert!(result.title.is_none());
    }

    #[test]
    fn test_plain_text_input() {
        let result = extract("not really html", 100);
        assert_eq!(result.text, "not really html");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\n b\t c  "), "a b c");
    }

    #[test]
    fn test_truncate_chars_shorter_than_budget() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
