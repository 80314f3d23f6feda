//! Parsed-document capability.
//!
//! The extraction heuristics only need a handful of operations on an
//! element: CSS queries, text, attributes, and sibling/ancestor walks.
//! `DomNode` captures exactly that, and `scraper::ElementRef` implements it.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// An element handle inside a parsed HTML document.
pub trait DomNode: Clone {
    /// Descendants matching a CSS selector, in document order.
    /// An unparsable selector matches nothing.
    fn select_all(&self, selector: &str) -> Vec<Self>;

    /// Whether this element itself matches a CSS selector.
    fn matches(&self, selector: &str) -> bool;

    /// Concatenated descendant text, trimmed.
    fn text_content(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// Lowercase tag name.
    fn tag_name(&self) -> String;

    fn parent_element(&self) -> Option<Self>;

    /// Element children, in document order.
    fn element_children(&self) -> Vec<Self>;

    /// Preceding element siblings, nearest first.
    fn preceding_siblings(&self) -> Vec<Self>;

    /// Following element siblings, nearest first.
    fn following_siblings(&self) -> Vec<Self>;

    /// Ancestor elements, nearest first.
    fn ancestor_elements(&self) -> Vec<Self>;

    /// First descendant matching `selector`.
    fn select_first(&self, selector: &str) -> Option<Self> {
        self.select_all(selector).into_iter().next()
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(sel) => Some(sel),
        Err(err) => {
            warn!(selector, error = ?err, "Invalid CSS selector");
            None
        }
    }
}

impl<'a> DomNode for ElementRef<'a> {
    fn select_all(&self, selector: &str) -> Vec<Self> {
        match parse_selector(selector) {
            Some(sel) => self.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    fn matches(&self, selector: &str) -> bool {
        parse_selector(selector).is_some_and(|sel| sel.matches(self))
    }

    fn text_content(&self) -> String {
        self.text().collect::<String>().trim().to_string()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn tag_name(&self) -> String {
        self.value().name().to_ascii_lowercase()
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().and_then(ElementRef::wrap)
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn preceding_siblings(&self) -> Vec<Self> {
        self.prev_siblings().filter_map(ElementRef::wrap).collect()
    }

    fn following_siblings(&self) -> Vec<Self> {
        self.next_siblings().filter_map(ElementRef::wrap).collect()
    }

    fn ancestor_elements(&self) -> Vec<Self> {
        self.ancestors().filter_map(ElementRef::wrap).collect()
    }
}

/// Parse a full HTML document.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}
