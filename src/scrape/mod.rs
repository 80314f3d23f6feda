//! Injury-report extraction.
//!
//! A pipeline of pure functions over a parsed document:
//! locate tables → classify headers + attribute team → extract rows →
//! deduplicate. When the table walk finds nothing, two fallback
//! strategies run: a heading-anchored sweep, then a table walk that
//! attributes unlabelled rows to a placeholder team.
//!
//! Nothing in here fails. Markup that does not fit the heuristics just
//! produces fewer records.

pub mod dedup;
pub mod dom;
pub mod headers;
pub mod locator;
pub mod rows;
pub mod team;

use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::types::{InjuryRecord, UNKNOWN_TEAM};
use dedup::dedup_records;
use dom::DomNode;
use headers::classify_table;
use locator::locate_tables;
use rows::{extract_rows, is_valid_record, positional_fields, row_cells, table_rows, LinkResolver, RowCell};
use team::{initial_team, is_heading_team_label, label_before, TeamContext};

/// Elements that mark a table's surroundings as injury content.
const INJURY_CONTEXT_SELECTOR: &str = "[class*=\"injuries\"], [class*=\"Injuries\"], h2, h3";

/// Headings the fallback sweep anchors on.
const SWEEP_HEADING_SELECTOR: &str = "h2, h3, h4, [class*=\"team\"], [class*=\"Team\"]";

/// Extraction settings.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub links: LinkResolver,
}

impl ExtractOptions {
    pub fn from_config(cfg: &ScraperConfig) -> Self {
        Self {
            links: LinkResolver::from_base(&cfg.link_base_url),
        }
    }
}

/// Which strategy produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    TableWalk,
    HeadingSweep,
    Placeholder,
}

/// Parse `html` and extract its deduplicated injury records.
pub fn scrape_html(html: &str, opts: &ExtractOptions) -> Vec<InjuryRecord> {
    let document = dom::parse_document(html);
    extract_injuries(&document.root_element(), opts)
}

/// Extract deduplicated injury records below `root`.
pub fn extract_injuries<N: DomNode>(root: &N, opts: &ExtractOptions) -> Vec<InjuryRecord> {
    let (strategy, raw) = extract_raw(root, opts);
    let raw_count = raw.len();
    let unique = dedup_records(raw);

    info!(
        strategy = ?strategy,
        raw = raw_count,
        unique = unique.len(),
        "Scraped injuries"
    );
    if unique.is_empty() {
        warn!("No injuries found. The page structure may have changed.");
    }
    unique
}

/// Run the strategy cascade, returning the first non-empty result.
pub fn extract_raw<N: DomNode>(root: &N, opts: &ExtractOptions) -> (Strategy, Vec<InjuryRecord>) {
    let tables = locate_tables(root);
    info!(tables = tables.len(), "Found candidate tables");

    let records = walk_tables(&tables, TeamContext::new(), opts);
    if !records.is_empty() {
        return (Strategy::TableWalk, records);
    }

    debug!("Table walk found nothing, sweeping team headings");
    let records = heading_sweep(root, opts);
    if !records.is_empty() {
        return (Strategy::HeadingSweep, records);
    }

    debug!("Heading sweep found nothing, using placeholder team");
    let records = walk_tables(&tables, TeamContext::seeded(UNKNOWN_TEAM), opts);
    (Strategy::Placeholder, records)
}

// ---------------------------------------------------------------------------
// Table walk
// ---------------------------------------------------------------------------

/// Walk every table, carrying the team context from one to the next.
fn walk_tables<N: DomNode>(tables: &[N], ctx: TeamContext, opts: &ExtractOptions) -> Vec<InjuryRecord> {
    let (_, records) = tables.iter().fold((ctx, Vec::new()), |(ctx, mut all), table| {
        let (ctx, records) = walk_table(table, ctx, opts);
        all.extend(records);
        (ctx, all)
    });
    records
}

fn walk_table<N: DomNode>(table: &N, ctx: TeamContext, opts: &ExtractOptions) -> (TeamContext, Vec<InjuryRecord>) {
    let ctx = ctx.with_optional_team(initial_team(table));
    let headers = classify_table(table);

    if !headers.is_injury_table() && !has_injury_context(table) {
        // Not read for rows, but may still name the team of what follows.
        return (ctx.with_optional_team(label_before(table)), Vec::new());
    }

    let rows: Vec<Vec<RowCell>> = table_rows(table).iter().map(row_cells).collect();
    let (ctx, records) = extract_rows(&rows, &headers.mapping, ctx, &opts.links);
    debug!(
        rows = rows.len(),
        records = records.len(),
        injury_table = headers.is_injury_table(),
        team = ?ctx.team(),
        "Processed table"
    );
    (ctx, records)
}

fn has_injury_context<N: DomNode>(table: &N) -> bool {
    table
        .parent_element()
        .is_some_and(|parent| parent.select_first(INJURY_CONTEXT_SELECTOR).is_some())
}

// ---------------------------------------------------------------------------
// Heading sweep
// ---------------------------------------------------------------------------

/// For each team-like heading, read the next sibling table positionally
/// and attribute its rows to the heading.
fn heading_sweep<N: DomNode>(root: &N, opts: &ExtractOptions) -> Vec<InjuryRecord> {
    let mut records = Vec::new();

    for heading in root.select_all(SWEEP_HEADING_SELECTOR) {
        let team = heading.text_content();
        if !is_heading_team_label(&team) || team.contains('\n') {
            continue;
        }
        let Some(table) = heading
            .following_siblings()
            .into_iter()
            .find(|s| s.tag_name() == "table")
        else {
            continue;
        };

        for row in table_rows(&table) {
            let cells = row_cells(&row);
            let Some(fields) = positional_fields(&cells, &opts.links) else {
                continue;
            };
            if fields.name.chars().count() > 2 && is_valid_record(&fields.name, &fields.position) {
                records.push(fields.into_record(&team));
            }
        }
    }

    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
