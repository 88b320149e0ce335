//! Structural extraction of article teasers
//!
//! For every `<article>` element:
//!
//! | Field | Path (direct children only) |
//! |-------|-----------------------------|
//! | title | `header > h1`, text |
//! | link | `header > h1 > a`, `href` of the first anchor |
//! | summary | each `div` child, two element siblings on, then `div > p`, text |

use crate::db::NewArticle;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static ARTICLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article").expect("static selector"));

/// One `<article>` node's fields; `None` when the expected path is absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
}

impl ExtractedArticle {
    /// Names of the fields whose path was not found
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_none()),
            ("link", self.link.is_none()),
            ("summary", self.summary.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }

    /// Convert to a storable record. Missing fields become empty strings and
    /// relative links are resolved against `base`.
    pub fn into_new_article(self, base: &Url) -> NewArticle {
        let link = self
            .link
            .map(|href| base.join(&href).map(String::from).unwrap_or(href))
            .unwrap_or_default();

        NewArticle {
            title: self.title.unwrap_or_default(),
            link,
            summary: self.summary.unwrap_or_default(),
        }
    }
}

/// Lazily extract one record per `<article>` element, in document order
pub fn extract(document: &Html) -> impl Iterator<Item = ExtractedArticle> + '_ {
    document.select(&ARTICLE).map(extract_one)
}

/// Parse `html` and collect every record
pub fn extract_articles(html: &str) -> Vec<ExtractedArticle> {
    let document = Html::parse_document(html);
    extract(&document).collect()
}

fn extract_one(article: ElementRef<'_>) -> ExtractedArticle {
    let headings: Vec<ElementRef<'_>> = children(article, "header")
        .flat_map(|header| children(header, "h1"))
        .collect();

    let title = text_of(headings.iter().copied());

    let link = headings
        .iter()
        .flat_map(|heading| children(*heading, "a"))
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_owned);

    let summary = text_of(
        children(article, "div")
            .filter_map(next_element)
            .filter_map(next_element)
            .flat_map(|block| children(block, "div"))
            .flat_map(|block| children(block, "p")),
    );

    ExtractedArticle { title, link, summary }
}

/// Direct element children named `name`
fn children<'a>(parent: ElementRef<'a>, name: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

/// The next sibling that is an element, skipping text and comments
fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Concatenated, whitespace-collapsed text of the matched elements;
/// `None` when nothing matched
fn text_of<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Option<String> {
    let mut matched = false;
    let mut raw = String::new();
    for element in elements {
        matched = true;
        raw.extend(element.text());
    }

    matched.then(|| raw.split_whitespace().collect::<Vec<_>>().join(" "))
}
