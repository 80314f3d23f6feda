//! Header classification.
//!
//! Maps a table's column headers onto the six injury fields. Matching is a
//! loose, case-insensitive substring test in either direction, so "Pos."
//! and "EST. RETURN DATE" still classify.

use std::fmt;

use super::dom::DomNode;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Semantic column of an injury table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Pos,
    EstReturn,
    Date,
    Status,
    Comment,
}

impl Field {
    /// All fields, in the positional fallback order.
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Pos,
        Field::EstReturn,
        Field::Date,
        Field::Status,
        Field::Comment,
    ];

    /// Normalized header keyword for this field.
    pub fn keyword(self) -> &'static str {
        match self {
            Field::Name => "NAME",
            Field::Pos => "POS",
            Field::EstReturn => "EST. RETURN",
            Field::Date => "DATE",
            Field::Status => "STATUS",
            Field::Comment => "COMMENT",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Number of header keywords contained in `text` (case-insensitive).
pub fn header_keyword_count(text: &str) -> usize {
    let upper = text.to_uppercase();
    Field::ALL.iter().filter(|f| upper.contains(f.keyword())).count()
}

/// Whether `text` contains any header keyword.
pub fn contains_header_keyword(text: &str) -> bool {
    header_keyword_count(text) > 0
}

/// Trim + uppercase.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_uppercase()
}

fn header_matches(normalized: &str, field: Field) -> bool {
    let keyword = field.keyword();
    !normalized.is_empty() && (normalized.contains(keyword) || keyword.contains(normalized))
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Field → column index for one table. Empty when the table did not
/// classify as an injury table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    columns: [Option<usize>; 6],
}

impl HeaderMapping {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from raw header labels. Each field takes the first column whose
    /// header matches it.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h.as_ref())).collect();
        let mut mapping = Self::default();
        for field in Field::ALL {
            mapping.columns[field.index()] = normalized.iter().position(|h| header_matches(h, field));
        }
        mapping
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns[field.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Option::is_none)
    }

    /// Every field has a column.
    pub fn is_complete(&self) -> bool {
        self.columns.iter().all(Option::is_some)
    }

    /// Name and position are both mapped, so rows can be read by header.
    pub fn has_identity_columns(&self) -> bool {
        self.get(Field::Name).is_some() && self.get(Field::Pos).is_some()
    }
}

/// Whether a header row describes an injury table: every field must have
/// at least one header matching it.
pub fn is_injury_header_row<S: AsRef<str>>(headers: &[S]) -> bool {
    !headers.is_empty() && HeaderMapping::from_headers(headers).is_complete()
}

// ---------------------------------------------------------------------------
// Table classification
// ---------------------------------------------------------------------------

/// Where header cells are looked for, most specific first.
const HEADER_SELECTORS: &[&str] = &[
    "thead tr th",
    "thead tr td",
    "tbody tr:first-child th",
    "tbody tr:first-child td",
    "tr:first-child th",
    "tr:first-child td",
    ".Table__TH",
    "[class*=\"Table__TH\"]",
];

/// Header labels and mapping of one table.
#[derive(Debug, Clone, Default)]
pub struct TableHeaders {
    pub labels: Vec<String>,
    pub mapping: HeaderMapping,
}

impl TableHeaders {
    pub fn is_injury_table(&self) -> bool {
        !self.mapping.is_empty()
    }
}

/// Header labels from the first selector that yields any non-empty text.
/// Empty cells keep their slot so indices line up with data cells.
pub fn collect_header_labels<N: DomNode>(table: &N) -> Vec<String> {
    for selector in HEADER_SELECTORS {
        let labels: Vec<String> = table.select_all(selector).iter().map(DomNode::text_content).collect();
        if labels.iter().any(|l| !l.is_empty()) {
            return labels;
        }
    }
    Vec::new()
}

/// Classify a table. The mapping is only kept when the table qualifies as
/// an injury table.
pub fn classify_table<N: DomNode>(table: &N) -> TableHeaders {
    let labels = collect_header_labels(table);
    let mapping = if is_injury_header_row(labels.as_slice()) {
        HeaderMapping::from_headers(labels.as_slice())
    } else {
        HeaderMapping::empty()
    };
    TableHeaders { labels, mapping }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
