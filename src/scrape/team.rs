//! Team attribution.
//!
//! The page names teams in headings, captions, wrapper containers, or
//! sometimes as rows inside the table itself. Attribution is carried in a
//! `TeamContext` accumulator that is threaded through every table and row
//! of a scrape, so a heading placed before a group of tables applies to
//! all of them until something else names a team.

use regex::Regex;
use std::sync::LazyLock;

use super::dom::DomNode;
use super::headers::{header_keyword_count, HeaderMapping};

/// Heading-like siblings that may name the team of the following table.
const SIBLING_HEADING_SELECTOR: &str = "h2, h3, h4, h5, [class*=\"team\"], [class*=\"Team\"]";

/// Wrappers grouping a team's injuries.
const TEAM_CONTAINER_SELECTOR: &str =
    "[class*=\"team\"], [class*=\"Team\"], [class*=\"injuries\"], [class*=\"Injuries\"]";

/// Heading looked up inside a team wrapper.
const CONTAINER_HEADING_SELECTOR: &str = "h2, h3, h4, [class*=\"team\"]";

const LABEL_MIN_CHARS: usize = 3;
const LABEL_MAX_CHARS: usize = 40;

/// Row text shorter than this is never read as a team name.
pub const TEAM_ROW_MIN_CHARS: usize = 6;

static POSITION_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[CDGLRW]{1,2}$").expect("valid position regex"));

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The team currently attributed to rows being read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamContext {
    current: Option<String>,
}

impl TeamContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that starts out attributed to `team`.
    pub fn seeded(team: impl Into<String>) -> Self {
        Self { current: Some(team.into()) }
    }

    pub fn team(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Replace the attributed team.
    pub fn with_team(self, team: impl Into<String>) -> Self {
        Self { current: Some(team.into()) }
    }

    /// Replace the attributed team if a label was found, otherwise keep the
    /// running one.
    pub fn with_optional_team(self, team: Option<String>) -> Self {
        match team {
            Some(t) => self.with_team(t),
            None => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Label filters
// ---------------------------------------------------------------------------

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Length window and "not a column header" check shared by every label
/// source.
fn is_team_label(text: &str) -> bool {
    let len = char_len(text);
    (LABEL_MIN_CHARS..=LABEL_MAX_CHARS).contains(&len) && header_keyword_count(text) < 2
}

/// Stricter filter for sibling headings: double spaces usually mean
/// boilerplate, not a team name.
pub fn is_heading_team_label(text: &str) -> bool {
    is_team_label(text) && !text.contains("  ")
}

/// Filter for team names read out of a table row.
pub fn is_row_team_label(text: &str) -> bool {
    is_team_label(text) && !text.chars().all(|c| c.is_ascii_digit())
}

/// Team-name-sized text (6–40 chars).
pub fn has_team_name_length(text: &str) -> bool {
    (TEAM_ROW_MIN_CHARS..=LABEL_MAX_CHARS).contains(&char_len(text))
}

/// One- or two-letter hockey position code (C, D, G, LW, RW, ...).
pub fn is_position_code(text: &str) -> bool {
    POSITION_CODE.is_match(text.trim())
}

// ---------------------------------------------------------------------------
// Table-level attribution
// ---------------------------------------------------------------------------

/// Team named around a table, trying in order: the nearest heading-like
/// preceding sibling, a heading inside a team/injuries wrapper, the
/// table caption.
pub fn initial_team<N: DomNode>(table: &N) -> Option<String> {
    heading_before(table)
        .or_else(|| heading_in_container(table))
        .or_else(|| caption(table))
}

fn heading_before<N: DomNode>(table: &N) -> Option<String> {
    let heading = table
        .preceding_siblings()
        .into_iter()
        .find(|s| s.matches(SIBLING_HEADING_SELECTOR))?;
    let text = heading.text_content();
    is_heading_team_label(&text).then_some(text)
}

fn heading_in_container<N: DomNode>(table: &N) -> Option<String> {
    let container = table
        .ancestor_elements()
        .into_iter()
        .find(|a| a.matches(TEAM_CONTAINER_SELECTOR))?;
    let text = container.select_first(CONTAINER_HEADING_SELECTOR)?.text_content();
    is_team_label(&text).then_some(text)
}

fn caption<N: DomNode>(table: &N) -> Option<String> {
    let text = table.select_first("caption")?.text_content();
    is_team_label(&text).then_some(text)
}

/// Label from the element right before a table that is not read for rows.
pub fn label_before<N: DomNode>(table: &N) -> Option<String> {
    let text = table.preceding_siblings().into_iter().next()?.text_content();
    is_team_label(&text).then_some(text)
}

// ---------------------------------------------------------------------------
// Row-level attribution
// ---------------------------------------------------------------------------

/// What a row is, before any field extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Column header row; skipped.
    Header,
    /// Team-name row. Carries the label when it is usable as a team name.
    Team(Option<String>),
    /// Candidate player row.
    Data,
}

/// Classify a row from its cell texts.
///
/// Precedence: header row, then a single-cell row, then (only for tables
/// without NAME/POS columns) a row whose second cell is not a position
/// code and whose first cell is team-name sized.
pub fn classify_row_kind<S: AsRef<str>>(cells: &[S], mapping: &HeaderMapping) -> RowKind {
    let Some(first) = cells.first().map(|c| c.as_ref().trim()) else {
        return RowKind::Data;
    };

    if header_keyword_count(first) >= 2 {
        return RowKind::Header;
    }

    if cells.len() == 1 {
        return RowKind::Team(is_row_team_label(first).then(|| first.to_string()));
    }

    if !mapping.has_identity_columns() {
        let second = cells.get(1).map(|c| c.as_ref()).unwrap_or("");
        if !is_position_code(second) && has_team_name_length(first) {
            return RowKind::Team(is_row_team_label(first).then(|| first.to_string()));
        }
    }

    RowKind::Data
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
