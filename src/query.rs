//! Read side. Every function is a pure read over the store.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::franchise::{self, FranchiseRating};
use crate::history::{self, TeamHistory};
use crate::model::{MatchupId, Record, RecordType, TeamId};
use crate::notable::{self, NotableGames};
use crate::records::{self, RecordBook};
use crate::report::{self, SeasonReport};
use crate::standings::Tier;
use crate::store;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team_id: TeamId,
    pub team_name: String,
    pub owner_name: String,
    pub points_for: f64,
    pub points_against: f64,
    pub actual: Record,
    pub actual_rank: u32,
    pub power: Record,
    pub power_rank: u32,
    pub median: Record,
    pub median_rank: u32,
    pub combined: Record,
    pub combined_rank: u32,
    pub tier: Tier,
}

/// Stored standings for a season, actual rank first. Empty until the
/// season has been recomputed.
pub fn standings(conn: &Connection, year: i32) -> Result<Vec<StandingsEntry>> {
    let season = store::load_season(conn, year)?;
    let rows = store::load_team_season_stats(conn, Some(year))?;
    Ok(rows
        .into_iter()
        .map(|s| {
            let team = season.team(s.team_id);
            StandingsEntry {
                team_id: s.team_id,
                team_name: team.map(|t| t.team_name.clone()).unwrap_or_default(),
                owner_name: team.map(|t| t.owner_name.clone()).unwrap_or_default(),
                points_for: s.points_for,
                points_against: s.points_against,
                actual: s.actual,
                actual_rank: s.actual_rank,
                power: s.power,
                power_rank: s.power_rank,
                median: s.median,
                median_rank: s.median_rank,
                combined: s.combined,
                combined_rank: s.combined_rank,
                tier: Tier::from_combined_rank(s.combined_rank),
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub record_type: RecordType,
    pub week: u32,
    pub value: f64,
    pub team_id: Option<TeamId>,
    pub matchup_id: Option<MatchupId>,
    /// Team name, or "home vs away" for matchup awards.
    pub label: String,
}

pub fn season_records(conn: &Connection, year: i32) -> Result<Vec<RecordEntry>> {
    let season = store::load_season(conn, year)?;
    let name = |id: TeamId| {
        season
            .team(id)
            .map(|t| t.team_name.clone())
            .unwrap_or_else(|| format!("Team {id}"))
    };
    let rows = store::load_league_records(conn, year)?;
    Ok(rows
        .into_iter()
        .map(|r| {
            let label = match (r.team_id, r.matchup_id) {
                (Some(team), _) => name(team),
                (None, Some(mid)) => season
                    .matchups
                    .iter()
                    .find(|m| m.id == mid)
                    .map(|m| match m.away_team_id {
                        Some(away) => format!("{} vs {}", name(m.home_team_id), name(away)),
                        None => name(m.home_team_id),
                    })
                    .unwrap_or_default(),
                (None, None) => String::new(),
            };
            RecordEntry {
                record_type: r.record_type,
                week: r.week,
                value: r.value,
                team_id: r.team_id,
                matchup_id: r.matchup_id,
                label,
            }
        })
        .collect())
}

pub fn season_report(conn: &Connection, year: i32, cfg: &AnalyticsConfig) -> Result<SeasonReport> {
    let snapshot = store::load_snapshot(conn)?;
    report::season_report(&snapshot, year, cfg)
}

pub fn league_history(conn: &Connection) -> Result<Vec<FranchiseRating>> {
    let snapshot = store::load_snapshot(conn)?;
    Ok(franchise::franchise_ratings(&snapshot))
}

/// Upset factors read the stored combined ranks, so run a recompute first.
pub fn notable_games(conn: &Connection, cfg: &AnalyticsConfig) -> Result<NotableGames> {
    let snapshot = store::load_snapshot(conn)?;
    let ranks = store::load_combined_ranks(conn)?;
    Ok(notable::notable_games(&snapshot, &ranks, cfg))
}

pub fn record_book(conn: &Connection, cfg: &AnalyticsConfig) -> Result<RecordBook> {
    let snapshot = store::load_snapshot(conn)?;
    Ok(records::record_book(&snapshot, cfg.record_book_top_n))
}

pub fn team_history(conn: &Connection, key: &str) -> Result<TeamHistory> {
    let snapshot = store::load_snapshot(conn)?;
    history::team_history(&snapshot, key)
}
