//! Fetching and parsing of article and comment pages.
//!
//! Harvesting an article follows a fixed two-step pattern:
//!
//! 1. **Article**: fetch the article page and pull every field out of it
//!    ([`article`]). A missing title, author, time element or `datetime`
//!    attribute discards the article.
//! 2. **Comments**: fetch `<article>/comments/` and pair comment bodies with
//!    their authors ([`comments`]). Any failure here yields empty lists.
//!
//! # Submodules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`fetcher`] | HTTP GET with the fixed fetch policy, [`fetcher::PageSource`] seam |
//! | [`selectors`] | The one table of CSS selectors |
//! | [`article`] | Article field extraction |
//! | [`comments`] | Comment page URL, fetch and pairing |

use scraper::ElementRef;
use thiserror::Error;

pub mod article;
pub mod comments;
pub mod fetcher;
pub mod selectors;

/// Markup did not have the shape the selector table expects.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("required field `{field}` not found (selector `{selector}`)")]
    MissingElement {
        field: &'static str,
        selector: &'static str,
    },

    #[error("field `{field}` has no `{attribute}` attribute")]
    MissingAttribute {
        field: &'static str,
        attribute: &'static str,
    },

    #[error("selector `{selector}` does not compile: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },
}

/// All descendant text of `element`, concatenated and trimmed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    visible_text(element).collect::<String>().trim().to_string()
}

/// Text nodes under `element`, without `<script>` and `<style>` contents.
pub(crate) fn visible_text<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|el| matches!(el.name(), "script" | "style"));
        (!hidden).then_some(&**text)
    })
}
