//! Table location.
//!
//! Finds the elements worth examining for injury rows. Selectors are tried
//! in priority order and the first one that matches anything wins; results
//! from different selectors are never merged.

use super::dom::DomNode;

/// Table selectors, most specific first.
const TABLE_SELECTORS: &[&str] = &[
    "table[class*=\"Table\"]",
    "table[class*=\"injuries\"]",
    "table[class*=\"Injuries\"]",
    "table",
];

/// Non-table containers for pages that render injuries as div grids.
const CONTAINER_SELECTORS: &[&str] = &[
    "[class*=\"injuries\"] .Table__TBODY",
    "[class*=\"Injuries\"] .Table__TBODY",
    ".Table__TBODY",
    "[data-testid*=\"injuries\"]",
];

/// Candidate table-like elements, in document order.
pub fn locate_tables<N: DomNode>(root: &N) -> Vec<N> {
    first_match(root, TABLE_SELECTORS).unwrap_or_else(|| first_match(root, CONTAINER_SELECTORS).unwrap_or_default())
}

fn first_match<N: DomNode>(root: &N, selectors: &[&str]) -> Option<Vec<N>> {
    selectors
        .iter()
        .map(|sel| root.select_all(sel))
        .find(|found| !found.is_empty())
}
