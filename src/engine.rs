//! Load, compute, replace: the per-season recompute job.

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::model::{LeagueRecord, SeasonSnapshot, TeamSeasonStats};
use crate::records;
use crate::score_index::{IndexFilter, ScoreIndex};
use crate::standings;
use crate::store;

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonAnalytics {
    pub year: i32,
    /// Weeks that fed the standings.
    pub weeks: usize,
    pub stats: Vec<TeamSeasonStats>,
    pub records: Vec<LeagueRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeSummary {
    pub year: i32,
    pub weeks: usize,
    pub teams_written: usize,
    pub records_written: usize,
}

/// Pure computation over one season's rows.
pub fn compute_season_analytics(season: &SeasonSnapshot, cfg: &AnalyticsConfig) -> SeasonAnalytics {
    let year = season.year();
    let malformed = season
        .matchups
        .iter()
        .filter(|m| !m.is_bye && m.away_team_id.is_none_or(|away| away == m.home_team_id))
        .count();
    if malformed > 0 {
        warn!(year, malformed, "skipping matchups without a distinct away team");
    }

    let index = ScoreIndex::build(&season.matchups, IndexFilter::standings(cfg));
    let scores = index.season_or_empty(year);
    for week in scores.weeks() {
        debug!(year, week, scores = scores.week_scores(week).len(), "indexed week");
    }

    SeasonAnalytics {
        year,
        weeks: scores.week_count(),
        stats: standings::compute_team_season_stats(year, &season.teams, &scores),
        records: records::season_records(year, &season.matchups, cfg.max_standings_week, cfg.record_top_n),
    }
}

pub fn recompute_season(conn: &mut Connection, year: i32, cfg: &AnalyticsConfig) -> Result<RecomputeSummary> {
    let season = store::load_season(conn, year)?;
    let run_id = store::begin_run(conn, year)?;

    let analytics = compute_season_analytics(&season, cfg);
    if let Err(err) = store::replace_season_analytics(conn, year, &analytics.stats, &analytics.records) {
        if let Err(close) = store::fail_run(conn, run_id, &err.to_string()) {
            warn!(year, run_id, error = %close, "could not close failed run");
        }
        return Err(err);
    }
    store::finish_run(conn, run_id, analytics.stats.len(), analytics.records.len())?;

    let summary = RecomputeSummary {
        year,
        weeks: analytics.weeks,
        teams_written: analytics.stats.len(),
        records_written: analytics.records.len(),
    };
    info!(
        year,
        teams = summary.teams_written,
        weeks = summary.weeks,
        records = summary.records_written,
        "recomputed season analytics"
    );
    Ok(summary)
}

/// Every stored season, oldest first. A season without teams is logged
/// and skipped so the rest still recompute.
pub fn recompute_all(conn: &mut Connection, cfg: &AnalyticsConfig) -> Result<Vec<RecomputeSummary>> {
    let years = store::load_seasons(conn)?
        .into_iter()
        .map(|s| s.year)
        .collect::<Vec<_>>();
    let mut out = Vec::with_capacity(years.len());
    for year in years {
        match recompute_season(conn, year, cfg) {
            Ok(summary) => out.push(summary),
            Err(err) if err.is_not_found() => warn!(year, error = %err, "skipping season"),
            Err(err) => return Err(err),
        }
    }
    Ok(out)
}
