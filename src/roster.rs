//! Pool roster and player-name matching.
//!
//! The roster is a JSON document of pool teams, each with an owner and a
//! list of players. Injury names come from the page as "First Last" while
//! rosters are often kept as "Last, First", so matching compares a small
//! set of normalized variants of each name.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    #[serde(default)]
    pub teams: Vec<RosterTeam>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterTeam {
    pub team_name: String,
    pub owner: String,
    #[serde(default)]
    pub players: Vec<RosterPlayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterPlayer {
    pub name: String,
}

impl Roster {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse roster file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let roster: Roster = serde_json::from_str(contents)?;
        Ok(roster)
    }

    /// Owner of the first team carrying a player whose name matches.
    pub fn owner_of(&self, player_name: &str) -> Option<&str> {
        self.teams
            .iter()
            .find(|team| team.players.iter().any(|p| names_match(player_name, &p.name)))
            .map(|team| team.owner.as_str())
    }

    pub fn player_count(&self) -> usize {
        self.teams.iter().map(|t| t.players.len()).sum()
    }
}

/// Lowercased, whitespace-collapsed forms of a player name.
///
/// Accepts "First Last" or "Last, First" and yields the name as given plus
/// the other ordering. Single-word names yield one variant.
pub fn name_variants(name: &str) -> Vec<String> {
    let collapse = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let given = collapse(name);
    if given.is_empty() {
        return Vec::new();
    }

    let swapped = if given.contains(',') {
        let parts: Vec<&str> = given.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            [last, first] => Some(format!("{first} {last}")),
            _ => None,
        }
    } else {
        given
            .rsplit_once(' ')
            .map(|(first, last)| format!("{last}, {first}"))
    };

    let mut variants = vec![given];
    variants.extend(swapped);
    variants
}

/// Whether two names refer to the same player.
pub fn names_match(a: &str, b: &str) -> bool {
    let left = name_variants(a);
    name_variants(b).iter().any(|v| left.contains(v))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
