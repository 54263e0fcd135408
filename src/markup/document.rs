//! Parsed HTML document
//!
//! A thin layer over `scraper` exposing exactly what the harvester and
//! crawler need: CSS selection, element removal, title and visible text.

use crate::markup::links::{resolve_link, Hyperlink};
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while querying a document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type for markup operations
pub type MarkupResult<T> = Result<T, MarkupError>;

/// Parses a CSS selector, keeping the input in the error
pub fn parse_selector(selector: &str) -> MarkupResult<Selector> {
    Selector::parse(selector).map_err(|e| MarkupError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// An HTML document that can be queried and pruned
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses markup into a document
    ///
    /// HTML parsing never fails; malformed input is repaired the same way a
    /// browser would.
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Returns every element matching the selector, in document order
    pub fn select(&self, selector: &str) -> MarkupResult<Vec<ElementRef<'_>>> {
        let selector = parse_selector(selector)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Returns true if at least one element matches the selector
    pub fn contains(&self, selector: &str) -> MarkupResult<bool> {
        let selector = parse_selector(selector)?;
        let found = self.html.select(&selector).next().is_some();
        Ok(found)
    }

    /// Collects an attribute from every matching element that carries it
    pub fn attr_values(&self, selector: &str, attr: &str) -> MarkupResult<Vec<String>> {
        Ok(self
            .select(selector)?
            .into_iter()
            .filter_map(|element| element.value().attr(attr))
            .map(str::to_string)
            .collect())
    }

    /// Extracts the page title from the `<title>` element
    pub fn title(&self) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;

        self.html
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Returns the document's text with one space between text nodes
    ///
    /// Each text node is trimmed and empty nodes are skipped; whitespace
    /// inside a node is left alone.
    pub fn text(&self) -> String {
        let mut text = String::new();

        for piece in self.html.root_element().text() {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(piece);
        }

        text
    }

    /// Detaches every element with one of the given tag names
    ///
    /// Returns the number of elements removed.
    pub fn remove_elements<S: AsRef<str>>(&mut self, tag_names: &[S]) -> usize {
        let doomed: Vec<_> = self
            .html
            .tree
            .nodes()
            .filter(|node| match node.value() {
                Node::Element(element) => tag_names
                    .iter()
                    .any(|tag| tag.as_ref().eq_ignore_ascii_case(element.name())),
                _ => false,
            })
            .map(|node| node.id())
            .collect();

        for id in &doomed {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }

        doomed.len()
    }

    /// Lists every `<a href>` in document order
    ///
    /// Anchors marked `download` are skipped; each link carries its
    /// resolution against `base_url` when it is followable.
    pub fn hyperlinks(&self, base_url: &Url) -> Vec<Hyperlink> {
        let Ok(a_selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        self.html
            .select(&a_selector)
            .filter(|element| element.value().attr("download").is_none())
            .filter_map(|element| element.value().attr("href"))
            .map(|href| Hyperlink {
                href: href.to_string(),
                resolved: resolve_link(href, base_url),
            })
            .collect()
    }
}
