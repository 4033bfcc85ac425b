//! Comment thread extraction.
//!
//! The comments page lists comment bodies and comment authors as two
//! independent element sequences. They are paired by position: the i-th body
//! belongs to the i-th author. When the counts differ the excess elements of
//! the longer sequence are dropped.
//!
//! This pairing breaks if the site ever places extra elements matching either
//! selector between comments, e.g. deleted comments that keep an author link.

use scraper::{ElementRef, Html};
use tracing::{debug, instrument, warn};

use super::fetcher::PageSource;
use super::selectors::selectors;
use super::{ExtractError, element_text, visible_text};
use crate::models::Comment;

/// Path segment appended to an article URL to reach its comments.
pub const COMMENTS_PATH: &str = "comments/";

/// All comments of an article plus the ones written by its author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThread {
    pub comments: Vec<Comment>,
    pub from_author: Vec<Comment>,
}

/// `https://host/post/1/` and `https://host/post/1` both map to
/// `https://host/post/1/comments/`.
pub fn comments_url(article_url: &str) -> String {
    format!("{}/{}", article_url.trim_end_matches('/'), COMMENTS_PATH)
}

/// Pair comment bodies with authors and pick out the article author's replies.
pub fn extract_comments(html: &str, article_author: &str) -> Result<CommentThread, ExtractError> {
    let sel = selectors()?;
    let document = Html::parse_document(html);

    let bodies = document.select(&sel.comment_body);
    let authors = document.select(&sel.comment_author);

    let mut thread = CommentThread::default();
    for (body, author) in bodies.zip(authors) {
        let comment = Comment {
            author: element_text(author),
            text: stripped_text(body),
        };
        if comment.author == article_author {
            thread.from_author.push(comment.clone());
        }
        thread.comments.push(comment);
    }
    Ok(thread)
}

/// Fetch and parse the comments page of `article_url`.
///
/// Comments are optional: any fetch or parse failure is logged and yields an
/// empty thread.
#[instrument(level = "info", skip(source, article_author))]
pub async fn fetch_comments<S: PageSource>(
    source: &S,
    article_url: &str,
    article_author: &str,
) -> CommentThread {
    let url = comments_url(article_url);
    let html = match source.fetch(&url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(url = e.url(), error = %e, "Failed to fetch comments; continuing without them");
            return CommentThread::default();
        }
    };

    match extract_comments(&html, article_author) {
        Ok(thread) => {
            debug!(
                %url,
                comments = thread.comments.len(),
                from_author = thread.from_author.len(),
                "Parsed comments"
            );
            thread
        }
        Err(e) => {
            warn!(%url, error = %e, "Failed to parse comments; continuing without them");
            CommentThread::default()
        }
    }
}

/// Each text node trimmed, empty ones dropped, the rest glued together.
fn stripped_text(element: ElementRef<'_>) -> String {
    visible_text(element)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
