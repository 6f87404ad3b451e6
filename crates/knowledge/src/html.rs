//! HTML helpers built on `scraper`: visible text and outgoing links.

use scraper::{ElementRef, Html, Selector};
use siteqa_core::{AppError, AppResult};
use url::Url;

/// Elements whose content never counts as page text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header", "noscript", "template"];

/// Text and links pulled out of one HTML page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub text: String,
    pub links: Vec<Url>,
}

/// Parse `html` fetched from `base` in one pass.
pub fn parse_page(html: &str, base: &Url) -> AppResult<ParsedPage> {
    let document = Html::parse_document(html);
    Ok(ParsedPage {
        text: visible_text(&document),
        links: links(&document, base)?,
    })
}

/// Visible text of an HTML document.
///
/// Text nodes are trimmed, internal whitespace runs collapse to one space,
/// and the non-empty pieces are joined with single spaces.
pub fn extract_visible_text(html: &str) -> String {
    visible_text(&Html::parse_document(html))
}

/// Absolute http(s) targets of every `a[href]`, fragments stripped, in
/// document order. Duplicates are kept.
pub fn extract_links(html: &str, base: &Url) -> AppResult<Vec<Url>> {
    links(&Html::parse_document(html), base)
}

fn visible_text(document: &Html) -> String {
    let mut pieces = Vec::new();
    collect_text(document.root_element(), &mut pieces);
    pieces.join(" ")
}

fn collect_text(element: ElementRef<'_>, pieces: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                collect_text(child_element, pieces);
            }
        } else if let Some(text) = child.value().as_text() {
            let collapsed = collapse_whitespace(text);
            if !collapsed.is_empty() {
                pieces.push(collapsed);
            }
        }
    }
}

fn links(document: &Html, base: &Url) -> AppResult<Vec<Url>> {
    let selector = Selector::parse("a[href]")
        .map_err(|e| AppError::Crawl(format!("Invalid link selector: {:?}", e)))?;

    Ok(document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| normalize_link(base, href))
        .collect())
}

/// Resolve `href` against `base`, drop the fragment, and keep only http(s).
pub fn normalize_link(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href.trim()).ok()?;
    url.set_fragment(None);
    matches!(url.scheme(), "http" | "https").then_some(url)
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim_end().to_string()
}
