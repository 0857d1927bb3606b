//! All-time aggregation by franchise.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::model::{LeagueSnapshot, Record, Team, TeamId};
use crate::score_index::{AllPlay, IndexFilter, ScoreIndex};
use crate::stats;

const UNKNOWN: &str = "unknown";

/// Stable identity for a franchise across seasons, renames and owner
/// spelling drift.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FranchiseKey(String);

impl FranchiseKey {
    /// Validates an explicit key, e.g. from a CLI argument or import file.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AnalyticsError::InvalidFranchiseKey(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Explicit franchise id wins; otherwise the owner name, whitespace
    /// collapsed and lowercased.
    pub fn for_team(team: &Team) -> Self {
        if let Some(id) = team.franchise_id.as_deref()
            && let Ok(key) = Self::parse(id)
        {
            return key;
        }
        Self::from_owner(&team.owner_name)
    }

    pub fn from_owner(owner: &str) -> Self {
        let normalized = owner
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        if normalized.is_empty() {
            Self(UNKNOWN.to_string())
        } else {
            Self(normalized)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for a user-typed key naming this franchise, either form.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == raw.trim() || *self == Self::from_owner(raw)
    }
}

impl fmt::Display for FranchiseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Team rows per franchise, newest season first.
pub fn group_by_franchise(teams: &[Team]) -> BTreeMap<FranchiseKey, Vec<&Team>> {
    let mut groups: BTreeMap<FranchiseKey, Vec<&Team>> = BTreeMap::new();
    for team in teams {
        groups.entry(FranchiseKey::for_team(team)).or_default().push(team);
    }
    for seasons in groups.values_mut() {
        seasons.sort_by(|a, b| b.season_year.cmp(&a.season_year).then(a.id.cmp(&b.id)));
    }
    groups
}

/// Within-season points-per-game percentile, `(N - rank + 1) / N`.
pub fn pf_percentiles(teams: &[Team]) -> HashMap<TeamId, f64> {
    let mut by_season: BTreeMap<i32, Vec<&Team>> = BTreeMap::new();
    for t in teams {
        by_season.entry(t.season_year).or_default().push(t);
    }
    let mut out = HashMap::new();
    for mut season in by_season.into_values() {
        season.sort_by_key(|t| t.id);
        season.sort_by(|a, b| stats::desc(points_per_game(a), points_per_game(b)));
        let n = season.len();
        for (idx, t) in season.into_iter().enumerate() {
            out.insert(t.id, stats::rank_fraction(idx + 1, n));
        }
    }
    out
}

fn points_per_game(team: &Team) -> f64 {
    stats::ratio(team.points_for, team.games() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingInputs {
    pub win_pct: f64,
    pub all_play_pct: f64,
    pub pf_percentile: f64,
    pub championships: u32,
    pub runner_ups: u32,
    pub thirds: u32,
}

impl RatingInputs {
    pub fn rating(&self) -> i64 {
        (450.0 * self.win_pct
            + 300.0 * self.all_play_pct
            + 250.0 * self.pf_percentile
            + 100.0 * self.championships as f64
            + 50.0 * self.runner_ups as f64
            + 25.0 * self.thirds as f64)
            .round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FranchiseRating {
    pub key: FranchiseKey,
    pub owner_name: String,
    /// Most recent team name.
    pub team_name: String,
    pub record: Record,
    pub all_play: AllPlay,
    pub inputs: RatingInputs,
    pub league_rating: i64,
    pub seasons_played: usize,
}

/// One row per franchise, highest rating first.
pub fn franchise_ratings(snapshot: &LeagueSnapshot) -> Vec<FranchiseRating> {
    let index = ScoreIndex::build(&snapshot.matchups, IndexFilter::regular_season());
    let pf_pct = pf_percentiles(&snapshot.teams);

    let mut out = group_by_franchise(&snapshot.teams)
        .into_iter()
        .filter_map(|(key, seasons)| {
            let latest = seasons.first()?;
            let mut record = Record::default();
            let mut all_play = AllPlay::default();
            let mut weighted_pf = 0.0;
            let mut pf_weight = 0.0;
            for t in &seasons {
                record += t.record();
                if let Some(scores) = index.season(t.season_year) {
                    all_play += scores.team_all_play(t.id);
                }
                let games = t.games() as f64;
                weighted_pf += pf_pct.get(&t.id).copied().unwrap_or(0.0) * games;
                pf_weight += games;
            }
            let count = |place: u32| {
                seasons
                    .iter()
                    .filter(|t| t.final_standing() == Some(place))
                    .count() as u32
            };
            let inputs = RatingInputs {
                win_pct: record.win_pct(),
                all_play_pct: all_play.pct(),
                pf_percentile: stats::ratio(weighted_pf, pf_weight),
                championships: count(1),
                runner_ups: count(2),
                thirds: count(3),
            };
            Some(FranchiseRating {
                owner_name: latest.owner_name.clone(),
                team_name: latest.team_name.clone(),
                record,
                all_play,
                league_rating: inputs.rating(),
                inputs,
                seasons_played: seasons.len(),
                key,
            })
        })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| b.league_rating.cmp(&a.league_rating));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: i64, year: i32, owner: &str) -> Team {
        Team {
            id,
            season_year: year,
            franchise_id: None,
            owner_name: owner.to_string(),
            team_name: format!("team {id}"),
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
            final_standing: None,
        }
    }

    #[test]
    fn owner_names_normalize() {
        assert_eq!(
            FranchiseKey::from_owner("  Jane   Doe "),
            FranchiseKey::from_owner("jane doe")
        );
        assert_eq!(FranchiseKey::from_owner("   ").as_str(), "unknown");
    }

    #[test]
    fn explicit_id_beats_owner() {
        let mut t = team(1, 2020, "Jane Doe");
        t.franchise_id = Some("F-7".into());
        assert_eq!(FranchiseKey::for_team(&t).as_str(), "F-7");
        t.franchise_id = Some("  ".into());
        assert_eq!(FranchiseKey::for_team(&t).as_str(), "jane doe");
    }

    #[test]
    fn empty_explicit_key_is_rejected() {
        assert!(matches!(
            FranchiseKey::parse(" "),
            Err(AnalyticsError::InvalidFranchiseKey(_))
        ));
    }

    #[test]
    fn rating_formula() {
        let inputs = RatingInputs {
            win_pct: 0.5,
            all_play_pct: 0.5,
            pf_percentile: 0.5,
            championships: 1,
            runner_ups: 1,
            thirds: 1,
        };
        // 225 + 150 + 125 + 100 + 50 + 25
        assert_eq!(inputs.rating(), 675);
    }

    #[test]
    fn pf_percentile_is_per_game() {
        let mut a = team(1, 2020, "a");
        a.wins = 1;
        a.points_for = 100.0;
        let mut b = team(2, 2020, "b");
        b.wins = 2;
        b.points_for = 150.0;
        let pct = pf_percentiles(&[a, b]);
        assert_eq!(pct[&1], 1.0);
        assert_eq!(pct[&2], 0.5);
    }
}
