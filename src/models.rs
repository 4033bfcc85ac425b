//! Data models for harvested articles and their comments.
//!
//! This module defines the structures persisted to the JSON store:
//! - [`ArticleRecord`]: One fully parsed article plus its comment thread
//! - [`Comment`]: A single author/text pair taken from the comments page
//!
//! Field order in [`ArticleRecord`] is the key order written to disk, so it
//! must not be rearranged without migrating existing stores.

use serde::{Deserialize, Serialize};

/// A single comment from an article's comments page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    /// Display name of the commenter, trimmed.
    pub author: String,
    /// Comment body with whitespace-only text nodes dropped.
    pub text: String,
}

/// The structured result of parsing one article page plus its comments.
///
/// Identity is [`ArticleRecord::url`]; the store never holds two records with
/// the same URL. Records are created once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The article URL exactly as it appeared in the input list.
    pub url: String,
    /// Primary heading of the article.
    pub title: String,
    /// First whitespace-delimited token of the author's display name.
    pub author: String,
    /// Raw `datetime` attribute of the page's time element.
    pub date: String,
    /// Reading-time label, if the page shows one.
    pub reading_time: Option<String>,
    /// Total view counter, if the page shows one.
    pub views: Option<String>,
    /// Body text with text nodes separated by newlines.
    pub text_content: String,
    /// `src` of every image inside the body, in document order.
    pub image_content: Vec<String>,
    /// Tag link labels, in document order.
    pub tags: Vec<String>,
    /// Every comment on the comments page.
    pub comments: Vec<Comment>,
    /// The subset of `comments` written by the article's author.
    pub comments_from_author: Vec<Comment>,
}
