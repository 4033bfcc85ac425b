//! The single extraction-mapping table.
//!
//! Every CSS selector the harvester depends on is listed in [`SELECTOR_TABLE`].
//! When the site's markup changes, this is the only place to edit.

use once_cell::sync::OnceCell;
use scraper::Selector;

use super::ExtractError;

/// Raw CSS selectors, one per extracted field.
#[derive(Debug, Clone, Copy)]
pub struct SelectorTable {
    pub title: &'static str,
    pub author: &'static str,
    pub time: &'static str,
    pub reading_time: &'static str,
    pub views: &'static str,
    pub body: &'static str,
    pub image: &'static str,
    pub tag: &'static str,
    pub comment_body: &'static str,
    pub comment_author: &'static str,
}

pub const SELECTOR_TABLE: SelectorTable = SelectorTable {
    title: "h1.tm-title",
    author: "span.tm-user-info__user",
    time: "time",
    reading_time: "span.tm-article-reading-time__label",
    views: "span.tm-icon-counter__value",
    body: "div#post-content-body",
    image: "img",
    tag: "a.tm-tags-list__link",
    comment_body: "div.tm-comment__body-content",
    comment_author: "a.tm-user-info__username",
};

/// [`SelectorTable`] compiled into `scraper` selectors.
#[derive(Debug)]
pub struct Selectors {
    pub title: Selector,
    pub author: Selector,
    pub time: Selector,
    pub reading_time: Selector,
    pub views: Selector,
    pub body: Selector,
    pub image: Selector,
    pub tag: Selector,
    pub comment_body: Selector,
    pub comment_author: Selector,
}

static COMPILED: OnceCell<Selectors> = OnceCell::new();

impl Selectors {
    /// Compile every entry of `table`.
    pub fn compile(table: &SelectorTable) -> Result<Self, ExtractError> {
        Ok(Self {
            title: create_selector(table.title)?,
            author: create_selector(table.author)?,
            time: create_selector(table.time)?,
            reading_time: create_selector(table.reading_time)?,
            views: create_selector(table.views)?,
            body: create_selector(table.body)?,
            image: create_selector(table.image)?,
            tag: create_selector(table.tag)?,
            comment_body: create_selector(table.comment_body)?,
            comment_author: create_selector(table.comment_author)?,
        })
    }
}

/// The compiled [`SELECTOR_TABLE`], built on first use.
pub fn selectors() -> Result<&'static Selectors, ExtractError> {
    COMPILED.get_or_try_init(|| Selectors::compile(&SELECTOR_TABLE))
}

#[inline]
fn create_selector(sel_str: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(sel_str).map_err(|e| ExtractError::Selector {
        selector: sel_str,
        reason: e.to_string(),
    })
}
