use anyhow::{Result, anyhow};
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Upper bound on the normalized text kept per page.
pub const MAX_TEXT_CHARS: usize = 20_000;

/// A character filter receives the text as a whole and returns a transformed copy. Filters are
/// chained, so the HTML filter runs first and turns markup into plain text, then whitespace is
/// collapsed and finally the text is cut to size.
pub trait CharacterFilter: Send + Sync {
    fn filter(&self, text: String) -> String;
}

/// Strips markup. Contents of script, style and noscript blocks are dropped entirely.
#[derive(Debug, Default)]
pub struct HTMLTagFilter;

impl HTMLTagFilter {
    pub fn get_dom(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(html)
    }

    pub fn is_invisible(local: &LocalName) -> bool {
        matches!(&**local, "script" | "style" | "noscript" | "template")
    }

    pub fn walk_html(handle: &Handle, out: &mut String) {
        let node = handle;
        match &node.data {
            NodeData::Text { contents } => {
                let s = contents.borrow();
                let s = s.trim();
                if !s.is_empty() {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(s);
                }
            }
            NodeData::Element { name, .. } => {
                if Self::is_invisible(&name.local) {
                    return;
                }
                for child in node.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
            }
            NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
            _ => {
                for child in node.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
            }
        }
    }
}

impl CharacterFilter for HTMLTagFilter {
    fn filter(&self, html: String) -> String {
        let dom = Self::get_dom(&html);
        let mut out = String::new();
        Self::walk_html(&dom.document, &mut out);
        out
    }
}

/// Collapses every run of whitespace into a single space and trims both ends.
pub struct WhiteSpaceCollapseFilter;

impl CharacterFilter for WhiteSpaceCollapseFilter {
    fn filter(&self, text: String) -> String {
        compress_whitespaces(&text)
    }
}

/// Keeps at most `max_chars` characters (not bytes).
pub struct TruncateFilter {
    max_chars: usize,
}

impl TruncateFilter {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl CharacterFilter for TruncateFilter {
    fn filter(&self, mut text: String) -> String {
        let cut = text.char_indices().nth(self.max_chars).map(|(idx, _)| idx);
        if let Some(idx) = cut {
            text.truncate(idx);
        }
        text
    }
}

pub fn compress_whitespaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// The parts of a fetched page the crawler cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedPage {
    pub title: String,
    pub text: String,
    pub links: Vec<Url>,
}

/// Pure page analysis: no I/O, just HTML in and title, text and links out.
pub struct PageAnalyzer {
    char_filters: Vec<Box<dyn CharacterFilter>>,
}

impl Default for PageAnalyzer {
    fn default() -> Self {
        Self::with_max_chars(MAX_TEXT_CHARS)
    }
}

impl PageAnalyzer {
    pub fn new(char_filters: Vec<Box<dyn CharacterFilter>>) -> Self {
        Self { char_filters }
    }

    pub fn with_max_chars(max_chars: usize) -> Self {
        Self::new(vec![
            Box::new(HTMLTagFilter),
            Box::new(WhiteSpaceCollapseFilter),
            Box::new(TruncateFilter::new(max_chars)),
        ])
    }

    pub fn char_filter(&self, mut content: String) -> String {
        for filter in self.char_filters.iter() {
            content = filter.filter(content);
        }
        content
    }

    /// Analyzes a page fetched from `base_url`. Relative links are resolved against it.
    pub fn analyze(&self, html: &str, base_url: &Url) -> Result<AnalyzedPage> {
        let text = self.char_filter(html.to_string());

        let document = Html::parse_document(html);
        let title = extract_title(&document)?;
        let links = extract_links(&document, base_url)?;

        Ok(AnalyzedPage { title, text, links })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

fn extract_title(document: &Html) -> Result<String> {
    let title_selector = selector("title")?;
    let title = document
        .select(&title_selector)
        .next()
        .map(|t| compress_whitespaces(&t.text().collect::<String>()))
        .unwrap_or_default();
    Ok(title)
}

fn extract_links(document: &Html, base: &Url) -> Result<Vec<Url>> {
    let href_selector = selector("a[href]")?;
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&href_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = base.join(href.trim()) else {
            continue;
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        resolved.set_fragment(None);
        if seen.insert(resolved.to_string()) {
            links.push(resolved);
        }
    }

    Ok(links)
}
