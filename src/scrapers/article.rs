//! Article page field extraction.
//!
//! Fields are extracted in a fixed order. The title, the author element and a
//! time element carrying `datetime` are mandatory; everything else falls back
//! to `None` or an empty value.

use scraper::{ElementRef, Html};
use tracing::debug;

use super::selectors::{SELECTOR_TABLE, Selectors, selectors};
use super::{ExtractError, element_text, visible_text};
use crate::models::{ArticleRecord, Comment};

/// Every field of an article page, before comments are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFields {
    pub title: String,
    pub author: String,
    pub date: String,
    pub reading_time: Option<String>,
    pub views: Option<String>,
    pub text_content: String,
    pub image_content: Vec<String>,
    pub tags: Vec<String>,
}

impl ArticleFields {
    /// Attach the comment thread and the article URL, producing a record.
    pub fn into_record(
        self,
        url: &str,
        comments: Vec<Comment>,
        comments_from_author: Vec<Comment>,
    ) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            title: self.title,
            author: self.author,
            date: self.date,
            reading_time: self.reading_time,
            views: self.views,
            text_content: self.text_content,
            image_content: self.image_content,
            tags: self.tags,
            comments,
            comments_from_author,
        }
    }
}

/// Extract all article fields from raw page HTML.
pub fn extract_article(html: &str) -> Result<ArticleFields, ExtractError> {
    let sel = selectors()?;
    let document = Html::parse_document(html);

    let title = document
        .select(&sel.title)
        .next()
        .map(element_text)
        .ok_or(ExtractError::MissingElement {
            field: "title",
            selector: SELECTOR_TABLE.title,
        })?;

    let author = document
        .select(&sel.author)
        .next()
        .map(|el| first_name(&element_text(el)))
        .ok_or(ExtractError::MissingElement {
            field: "author",
            selector: SELECTOR_TABLE.author,
        })?;

    let date = extract_date(&document, sel)?;

    let reading_time = document.select(&sel.reading_time).next().map(element_text);

    // The page repeats the counter; the last one holds total views.
    let views = document.select(&sel.views).last().map(element_text);

    let body = document.select(&sel.body).next();
    let text_content = body.map(body_text).unwrap_or_default();
    let image_content: Vec<String> = body
        .map(|b| {
            b.select(&sel.image)
                .filter_map(|img| img.value().attr("src"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let tags = document.select(&sel.tag).map(element_text).collect::<Vec<_>>();

    debug!(
        %title,
        %author,
        %date,
        text_bytes = text_content.len(),
        images = image_content.len(),
        tags = tags.len(),
        "Extracted article fields"
    );

    Ok(ArticleFields {
        title,
        author,
        date,
        reading_time,
        views,
        text_content,
        image_content,
        tags,
    })
}

fn extract_date(document: &Html, sel: &Selectors) -> Result<String, ExtractError> {
    let time = document
        .select(&sel.time)
        .next()
        .ok_or(ExtractError::MissingElement {
            field: "date",
            selector: SELECTOR_TABLE.time,
        })?;
    time.value()
        .attr("datetime")
        .map(str::to_string)
        .ok_or(ExtractError::MissingAttribute {
            field: "date",
            attribute: "datetime",
        })
}

/// Display names are "First Last"; only the first token is kept.
fn first_name(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Body text nodes joined by newlines, scripts and styles left out.
fn body_text(body: ElementRef<'_>) -> String {
    visible_text(body).collect::<Vec<_>>().join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<html><body>
        <h1 class="tm-title tm-title_h1"><span>Hello</span></h1>
        <span class="tm-user-info__user"> Jane Doe </span>
        <time datetime="2024-03-01T10:00:00.000Z">1 March</time>
        <span class="tm-article-reading-time__label">4 min</span>
        <span class="tm-icon-counter__value">12</span>
        <span class="tm-icon-counter__value">3.4K</span>
        <div id="post-content-body"><p>First paragraph.</p><p>Second <img src="img1.png"> one.</p><img alt="no src"></div>
        <a class="tm-tags-list__link" href="/t/python"> python </a>
        <a class="tm-tags-list__link" href="/t/web">web</a>
    </body></html>"#;

    #[test]
    fn test_extracts_all_fields() {
        let fields = extract_article(ARTICLE).unwrap();
        assert_eq!(fields.title, "Hello");
        assert_eq!(fields.author, "Jane");
        assert_eq!(fields.date, "2024-03-01T10:00:00.000Z");
        assert_eq!(fields.reading_time.as_deref(), Some("4 min"));
        assert_eq!(fields.views.as_deref(), Some("3.4K"));
        assert_eq!(fields.text_content, "First paragraph.\nSecond \n one.");
        assert_eq!(fields.image_content, vec!["img1.png"]);
        assert_eq!(fields.tags, vec!["python", "web"]);
    }

    #[test]
    fn test_optional_fields_fall_back() {
        let html = r#"<h1 class="tm-title">T</h1>
            <span class="tm-user-info__user">Solo</span>
            <time datetime="2024-01-01">x</time>"#;
        let fields = extract_article(html).unwrap();
        assert_eq!(fields.author, "Solo");
        assert_eq!(fields.reading_time, None);
        assert_eq!(fields.views, None);
        assert_eq!(fields.text_content, "");
        assert!(fields.image_content.is_empty());
        assert!(fields.tags.is_empty());
    }

    #[test]
    fn test_missing_title_fails() {
        let html = r#"<span class="tm-user-info__user">A</span><time datetime="x"></time>"#;
        let err = extract_article(html).unwrap_err();
        assert!(matches!(err, ExtractError::MissingElement { field: "title", .. }));
    }

    #[test]
    fn test_missing_time_fails() {
        let html = r#"<h1 class="tm-title">T</h1><span class="tm-user-info__user">A</span>"#;
        let err = extract_article(html).unwrap_err();
        assert!(matches!(err, ExtractError::MissingElement { field: "date", .. }));
    }

    #[test]
    fn test_time_without_datetime_fails() {
        let html = r#"<h1 class="tm-title">T</h1>
            <span class="tm-user-info__user">A</span><time>yesterday</time>"#;
        let err = extract_article(html).unwrap_err();
        assert!(matches!(err, ExtractError::MissingAttribute { attribute: "datetime", .. }));
    }

    #[test]
    fn test_body_text_ignores_scripts_and_styles() {
        let html = r#"<h1 class="tm-title">T</h1>
            <span class="tm-user-info__user">A</span><time datetime="x"></time>
            <div id="post-content-body"><style>.x{}</style><p>Visible</p><script>track();</script><p>Also</p></div>"#;
        let fields = extract_article(html).unwrap();
        assert_eq!(fields.text_content, "Visible\nAlso");
    }

    #[test]
    fn test_first_name() {
        assert_eq!(first_name("Jane Doe"), "Jane");
        assert_eq!(first_name("  Jane\tDoe "), "Jane");
        assert_eq!(first_name(""), "");
    }

    #[test]
    fn test_into_record() {
        let record = extract_article(ARTICLE)
            .unwrap()
            .into_record("https://example.com/post/1", vec![], vec![]);
        assert_eq!(record.url, "https://example.com/post/1");
        assert_eq!(record.title, "Hello");
        assert!(record.comments.is_empty());
    }
}
