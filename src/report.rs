use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::luck::{self, LuckEntry};
use crate::model::LeagueSnapshot;
use crate::playoffs::{self, PlayoffBracket};
use crate::score_index::{IndexFilter, ScoreIndex};
use crate::standings::{self, StandingKind, StandingRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub year: i32,
    pub league_name: String,
    pub teams: Vec<String>,
    pub standings: Vec<StandingRow>,
    pub power_standings: Vec<StandingRow>,
    pub median_standings: Vec<StandingRow>,
    pub combined_standings: Vec<StandingRow>,
    pub luck_index: Vec<LuckEntry>,
    pub playoff_bracket: PlayoffBracket,
}

/// Live view of one season, computed from the snapshot rather than the
/// stored rows.
pub fn season_report(snapshot: &LeagueSnapshot, year: i32, cfg: &AnalyticsConfig) -> Result<SeasonReport> {
    let season = snapshot.season(year)?;
    let standings_index = ScoreIndex::build(&season.matchups, IndexFilter::standings(cfg));
    let standings_scores = standings_index.season_or_empty(year);
    let regular_index = ScoreIndex::build(&season.matchups, IndexFilter::regular_season());
    let regular_scores = regular_index.season_or_empty(year);

    let actual = standings::compute_standings(StandingKind::Actual, &season.teams, &standings_scores);
    let teams = actual.iter().map(|r| r.team_name.clone()).collect();

    Ok(SeasonReport {
        year,
        league_name: season.season.league_name.clone(),
        teams,
        power_standings: standings::compute_standings(StandingKind::Power, &season.teams, &standings_scores),
        median_standings: standings::compute_standings(StandingKind::Median, &season.teams, &standings_scores),
        combined_standings: standings::compute_standings(StandingKind::Combined, &season.teams, &standings_scores),
        standings: actual,
        luck_index: luck::luck_index(&season.teams, &regular_scores),
        playoff_bracket: playoffs::playoff_bracket(year, &season.teams, &season.matchups),
    })
}
