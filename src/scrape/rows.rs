//! Row extraction.
//!
//! Turns a table's rows into injury records. Each row is first reduced to
//! plain cell data, then classified by a pure function against the header
//! mapping and the running `TeamContext`; the table walk is a fold over
//! those outcomes.

use tracing::trace;
use url::Url;

use super::dom::DomNode;
use super::headers::{contains_header_keyword, Field, HeaderMapping};
use super::team::{classify_row_kind, has_team_name_length, is_position_code, RowKind, TeamContext};
use crate::types::InjuryRecord;

/// Row selectors; the first one that finds rows is used.
const ROW_SELECTORS: &[&str] = &["tbody tr", "tr", ".Table__TR", "[class*=\"Table__TR\"]"];

/// Cell selectors; the first one that finds cells is used, then the row's
/// element children.
const CELL_SELECTORS: &[&str] = &["td, th", ".Table__TD", "[class*=\"Table__TD\"]"];

const MAX_POSITION_CHARS: usize = 3;

// ---------------------------------------------------------------------------
// Cell data
// ---------------------------------------------------------------------------

/// Text and first link target of one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCell {
    pub text: String,
    pub href: Option<String>,
}

impl RowCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), href: None }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self { text: text.into(), href: Some(href.into()) }
    }
}

/// Rows of a table-like element.
pub fn table_rows<N: DomNode>(table: &N) -> Vec<N> {
    ROW_SELECTORS
        .iter()
        .map(|sel| table.select_all(sel))
        .find(|rows| !rows.is_empty())
        .unwrap_or_default()
}

/// Cell data of a row.
pub fn row_cells<N: DomNode>(row: &N) -> Vec<RowCell> {
    let cells = CELL_SELECTORS
        .iter()
        .map(|sel| row.select_all(sel))
        .find(|cells| !cells.is_empty())
        .unwrap_or_else(|| row.element_children());

    cells
        .iter()
        .map(|cell| RowCell {
            text: cell.text_content(),
            href: cell.select_first("a").and_then(|a| a.attribute("href")),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// Resolves player links against the site base URL.
#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    base: Option<Url>,
}

impl LinkResolver {
    pub fn new(base: Option<Url>) -> Self {
        Self { base }
    }

    /// Resolver for a base URL string; an unparsable base resolves only
    /// absolute links.
    pub fn from_base(base: &str) -> Self {
        Self::new(Url::parse(base).ok())
    }

    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        if let Ok(absolute) = Url::parse(href) {
            if absolute.scheme().starts_with("http") {
                return Some(absolute.to_string());
            }
        }
        let base = self.base.as_ref()?;
        base.join(href).ok().map(|u| u.to_string())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What a single row contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Nothing usable (empty, too few cells, invalid fields).
    Skipped,
    /// Column header row.
    Header,
    /// Names a team; becomes the running team.
    Team(String),
    /// A valid injury attributed to the running team.
    Injury(InjuryRecord),
    /// A valid-looking player row with no team to attribute it to; dropped.
    Unattributed,
}

/// Name and position pass the record invariants.
pub fn is_valid_record(name: &str, position: &str) -> bool {
    name.chars().count() > 1 && !contains_header_keyword(name) && is_valid_position(position)
}

fn is_valid_position(position: &str) -> bool {
    (1..=MAX_POSITION_CHARS).contains(&position.chars().count())
}

/// Column index per field: header mapping when it has NAME and POS,
/// otherwise positional for rows of at least two cells.
fn resolve_columns(mapping: &HeaderMapping, cell_count: usize) -> Option<[Option<usize>; 6]> {
    if mapping.has_identity_columns() {
        return Some(Field::ALL.map(|f| mapping.get(f)));
    }
    if cell_count < 2 {
        return None;
    }
    let mut positional = [None; 6];
    for (i, slot) in positional.iter_mut().enumerate() {
        *slot = (i < cell_count).then_some(i);
    }
    Some(positional)
}

/// Fields of a row, before team attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFields {
    pub name: String,
    pub position: String,
    pub est_return: String,
    pub date: String,
    pub status: String,
    pub comment: String,
    pub player_url: Option<String>,
}

impl RowFields {
    pub fn into_record(self, team: &str) -> InjuryRecord {
        InjuryRecord {
            team: team.to_string(),
            name: self.name,
            position: self.position,
            est_return: self.est_return,
            date: self.date,
            status: self.status,
            comment: self.comment,
            player_url: self.player_url,
        }
    }
}

fn read_fields(cells: &[RowCell], columns: &[Option<usize>; 6], links: &LinkResolver) -> RowFields {
    let cell_at = |field: Field| columns[field as usize].and_then(|i| cells.get(i));
    let text_at = |field: Field| cell_at(field).map(|c| c.text.trim().to_string()).unwrap_or_default();

    RowFields {
        name: text_at(Field::Name),
        position: text_at(Field::Pos),
        est_return: text_at(Field::EstReturn),
        date: text_at(Field::Date),
        status: text_at(Field::Status),
        comment: text_at(Field::Comment),
        player_url: cell_at(Field::Name)
            .and_then(|c| c.href.as_deref())
            .and_then(|href| links.resolve(href)),
    }
}

/// Fields read positionally (name, pos, est. return, date, status,
/// comment), for rows of at least two cells.
pub fn positional_fields(cells: &[RowCell], links: &LinkResolver) -> Option<RowFields> {
    let columns = resolve_columns(&HeaderMapping::empty(), cells.len())?;
    Some(read_fields(cells, &columns, links))
}

/// Classify one row.
///
/// Order: empty → header row → team row (single cell, or team-like row in
/// a table without NAME/POS columns) → field extraction → validation, with
/// invalid-position rows read as team names → attribution, where a row
/// with no known team may itself name the team.
pub fn classify_row(
    cells: &[RowCell],
    mapping: &HeaderMapping,
    ctx: &TeamContext,
    links: &LinkResolver,
) -> RowOutcome {
    if cells.is_empty() {
        return RowOutcome::Skipped;
    }

    let texts: Vec<&str> = cells.iter().map(|c| c.text.as_str()).collect();
    match classify_row_kind(texts.as_slice(), mapping) {
        RowKind::Header => return RowOutcome::Header,
        RowKind::Team(Some(label)) => return RowOutcome::Team(label),
        RowKind::Team(None) => return RowOutcome::Skipped,
        RowKind::Data => {}
    }

    let Some(columns) = resolve_columns(mapping, cells.len()) else {
        return RowOutcome::Skipped;
    };
    let fields = read_fields(cells, &columns, links);

    if !is_valid_record(&fields.name, &fields.position) {
        let team_like = fields.name.chars().count() > 3
            && !is_valid_position(&fields.position)
            && !contains_header_keyword(&fields.name);
        return if team_like {
            RowOutcome::Team(fields.name)
        } else {
            RowOutcome::Skipped
        };
    }

    match ctx.team() {
        Some(team) => RowOutcome::Injury(fields.into_record(team)),
        None => {
            let names_team = cells.len() == 1
                || (!is_position_code(&fields.position) && has_team_name_length(&fields.name));
            if names_team {
                RowOutcome::Team(fields.name)
            } else {
                RowOutcome::Unattributed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Table walk
// ---------------------------------------------------------------------------

/// Fold a table's rows into records, threading the team context.
pub fn extract_rows(
    rows: &[Vec<RowCell>],
    mapping: &HeaderMapping,
    ctx: TeamContext,
    links: &LinkResolver,
) -> (TeamContext, Vec<InjuryRecord>) {
    rows.iter().fold((ctx, Vec::new()), |(ctx, mut records), cells| {
        match classify_row(cells, mapping, &ctx, links) {
            RowOutcome::Injury(record) => {
                records.push(record);
                (ctx, records)
            }
            RowOutcome::Team(team) => {
                trace!(team = %team, "Team row");
                (ctx.with_team(team), records)
            }
            RowOutcome::Unattributed => {
                trace!(row = ?cells.first().map(|c| &c.text), "Dropping row with no team");
                (ctx, records)
            }
            RowOutcome::Skipped | RowOutcome::Header => (ctx, records),
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::dom::parse_document;

    fn mapping() -> HeaderMapping {
        HeaderMapping::from_headers(&["NAME", "POS", "EST. RETURN", "DATE", "STATUS", "COMMENT"])
    }

    fn links() -> LinkResolver {
        LinkResolver::from_base("https://www.espn.in")
    }

    fn row(texts: &[&str]) -> Vec<RowCell> {
        texts.iter().map(|t| RowCell::text(*t)).collect()
    }

    fn player(name: &str, pos: &str) -> Vec<RowCell> {
        row(&[name, pos, "Nov 1", "Oct 20", "Out", "Lower body injury."])
    }

    #[test]
    fn test_link_resolution() {
        let l = links();
        assert_eq!(
            l.resolve("/nhl/player/_/id/3900169").as_deref(),
            Some("https://www.espn.in/nhl/player/_/id/3900169")
        );
        assert_eq!(
            l.resolve("nhl/player/_/id/1").as_deref(),
            Some("https://www.espn.in/nhl/player/_/id/1")
        );
        assert_eq!(
            l.resolve("https://www.espn.com/nhl/player/_/id/2").as_deref(),
            Some("https://www.espn.com/nhl/player/_/id/2")
        );
        assert_eq!(l.resolve("  "), None);
        assert_eq!(LinkResolver::default().resolve("/relative"), None);
    }

    #[test]
    fn test_valid_record_rules() {
        assert!(is_valid_record("Charlie McAvoy", "D"));
        assert!(is_valid_record("Al", "LW"));
        assert!(!is_valid_record("A", "D"));
        assert!(!is_valid_record("Player Name", "D"));
        assert!(!is_valid_record("Charlie McAvoy", ""));
        assert!(!is_valid_record("Charlie McAvoy", "Defense"));
    }

    #[test]
    fn test_injury_row_with_team() {
        let ctx = TeamContext::seeded("Boston Bruins");
        let mut cells = player("Charlie McAvoy", "D");
        cells[0].href = Some("/nhl/player/_/id/4233563".into());
        match classify_row(&cells, &mapping(), &ctx, &links()) {
            RowOutcome::Injury(r) => {
                assert_eq!(r.team, "Boston Bruins");
                assert_eq!(r.name, "Charlie McAvoy");
                assert_eq!(r.position, "D");
                assert_eq!(r.est_return, "Nov 1");
                assert_eq!(r.date, "Oct 20");
                assert_eq!(r.status, "Out");
                assert_eq!(r.comment, "Lower body injury.");
                assert_eq!(
                    r.player_url.as_deref(),
                    Some("https://www.espn.in/nhl/player/_/id/4233563")
                );
            }
            other => panic!("expected injury, got {other:?}"),
        }
    }

    #[test]
    fn test_mapping_reorders_columns() {
        let m = HeaderMapping::from_headers(&["POS", "NAME", "STATUS", "DATE", "EST. RETURN", "COMMENT"]);
        let cells = row(&["G", "Linus Ullmark", "Day-To-Day", "Oct 18", "Oct 25", "Groin"]);
        let ctx = TeamContext::seeded("Ottawa Senators");
        let RowOutcome::Injury(r) = classify_row(&cells, &m, &ctx, &links()) else {
            panic!("expected injury");
        };
        assert_eq!(r.name, "Linus Ullmark");
        assert_eq!(r.position, "G");
        assert_eq!(r.status, "Day-To-Day");
        assert_eq!(r.est_return, "Oct 25");
    }

    #[test]
    fn test_header_and_empty_rows() {
        let ctx = TeamContext::seeded("Boston Bruins");
        let header = row(&["NAME POS", "EST. RETURN"]);
        assert_eq!(classify_row(&header, &mapping(), &ctx, &links()), RowOutcome::Header);
        assert_eq!(classify_row(&[], &mapping(), &ctx, &links()), RowOutcome::Skipped);
        // Single-keyword header cell slips past the header check but fails validation
        let th_row = row(&["NAME", "POS", "EST. RETURN", "DATE", "STATUS", "COMMENT"]);
        assert_eq!(classify_row(&th_row, &mapping(), &ctx, &links()), RowOutcome::Skipped);
    }

    #[test]
    fn test_single_cell_row_is_team() {
        let ctx = TeamContext::seeded("Boston Bruins");
        assert_eq!(
            classify_row(&row(&["Buffalo Sabres"]), &mapping(), &ctx, &links()),
            RowOutcome::Team("Buffalo Sabres".into())
        );
    }

    #[test]
    fn test_invalid_position_row_is_team() {
        let ctx = TeamContext::new();
        let cells = row(&["Carolina Hurricanes", "", "", "", "", ""]);
        assert_eq!(
            classify_row(&cells, &mapping(), &ctx, &links()),
            RowOutcome::Team("Carolina Hurricanes".into())
        );
        // Short junk is simply skipped
        assert_eq!(
            classify_row(&row(&["abc", "", ""]), &mapping(), &ctx, &links()),
            RowOutcome::Skipped
        );
    }

    #[test]
    fn test_no_team_known() {
        let ctx = TeamContext::new();
        // Looks like a player: dropped rather than given a placeholder team
        assert_eq!(
            classify_row(&player("Charlie McAvoy", "D"), &mapping(), &ctx, &links()),
            RowOutcome::Unattributed
        );
        // Position is not a hockey code and the name is team-sized: team row
        assert_eq!(
            classify_row(&player("New Jersey Devils", "NHL"), &mapping(), &ctx, &links()),
            RowOutcome::Team("New Jersey Devils".into())
        );
    }

    #[test]
    fn test_positional_fallback() {
        let ctx = TeamContext::seeded("Boston Bruins");
        let cells = row(&["Charlie McAvoy", "D", "Nov 1"]);
        let RowOutcome::Injury(r) = classify_row(&cells, &HeaderMapping::empty(), &ctx, &links()) else {
            panic!("expected injury");
        };
        assert_eq!(r.est_return, "Nov 1");
        assert_eq!(r.date, "");
        assert_eq!(r.comment, "");
    }

    #[test]
    fn test_fold_switches_team_mid_table() {
        let rows = vec![
            row(&["Boston Bruins"]),
            player("Charlie McAvoy", "D"),
            player("Brad Marchand", "LW"),
            row(&["Buffalo Sabres"]),
            player("Jeff Skinner", "LW"),
        ];
        let (ctx, records) = extract_rows(&rows, &mapping(), TeamContext::new(), &links());
        let teams: Vec<&str> = records.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["Boston Bruins", "Boston Bruins", "Buffalo Sabres"]);
        assert_eq!(ctx.team(), Some("Buffalo Sabres"));
    }

    #[test]
    fn test_row_cells_from_dom() {
        let doc = parse_document(
            r#"<table class="Table"><tbody>
                 <tr class="Table__TR"><td class="Table__TD"><a href="/nhl/player/_/id/1">Charlie McAvoy</a></td>
                 <td class="Table__TD">D</td></tr>
               </tbody></table>"#,
        );
        let table = doc.root_element().select_first("table").unwrap();
        let rows = table_rows(&table);
        assert_eq!(rows.len(), 1);
        let cells = row_cells(&rows[0]);
        assert_eq!(cells, vec![RowCell::link("Charlie McAvoy", "/nhl/player/_/id/1"), RowCell::text("D")]);
    }

    #[test]
    fn test_div_rows_fall_back_to_children() {
        let doc = parse_document(
            r#"<div class="Table__TBODY">
                 <div class="Table__TR"><span>Charlie McAvoy</span><span>D</span></div>
               </div>"#,
        );
        let body = doc.root_element().select_first(".Table__TBODY").unwrap();
        let rows = table_rows(&body);
        assert_eq!(rows.len(), 1);
        let texts: Vec<String> = row_cells(&rows[0]).into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["Charlie McAvoy", "D"]);
    }
}
