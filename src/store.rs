//! SQLite persistence for the raw league tables and the derived analytics.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::debug;

use crate::error::{AnalyticsError, Result};
use crate::model::{
    LeagueRecord, LeagueSnapshot, Matchup, Record, RecordType, Season, SeasonSnapshot, Team,
    TeamId, TeamSeasonStats,
};

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS seasons (
            year INTEGER PRIMARY KEY,
            league_name TEXT NOT NULL,
            regular_season_weeks INTEGER NOT NULL,
            is_legacy INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY,
            season_year INTEGER NOT NULL REFERENCES seasons(year),
            franchise_id TEXT NULL,
            owner_name TEXT NOT NULL,
            team_name TEXT NOT NULL,
            wins INTEGER NOT NULL,
            losses INTEGER NOT NULL,
            ties INTEGER NOT NULL,
            points_for REAL NOT NULL,
            points_against REAL NOT NULL,
            final_standing INTEGER NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_teams_season ON teams(season_year);

        CREATE TABLE IF NOT EXISTS matchups (
            id INTEGER PRIMARY KEY,
            season_year INTEGER NOT NULL REFERENCES seasons(year),
            week INTEGER NOT NULL,
            home_team_id INTEGER NOT NULL,
            away_team_id INTEGER NULL,
            home_score REAL NOT NULL,
            away_score REAL NOT NULL,
            is_playoff INTEGER NOT NULL,
            is_bye INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matchups_season_week ON matchups(season_year, week);

        CREATE TABLE IF NOT EXISTS team_season_stats (
            season_year INTEGER NOT NULL,
            team_id INTEGER NOT NULL,
            points_for REAL NOT NULL,
            points_against REAL NOT NULL,
            actual_wins INTEGER NOT NULL,
            actual_losses INTEGER NOT NULL,
            actual_ties INTEGER NOT NULL,
            power_wins INTEGER NOT NULL,
            power_losses INTEGER NOT NULL,
            power_ties INTEGER NOT NULL,
            median_wins INTEGER NOT NULL,
            median_losses INTEGER NOT NULL,
            median_ties INTEGER NOT NULL,
            combined_wins INTEGER NOT NULL,
            combined_losses INTEGER NOT NULL,
            combined_ties INTEGER NOT NULL,
            actual_rank INTEGER NOT NULL,
            power_rank INTEGER NOT NULL,
            median_rank INTEGER NOT NULL,
            combined_rank INTEGER NOT NULL,
            PRIMARY KEY (season_year, team_id)
        );

        CREATE TABLE IF NOT EXISTS league_records (
            record_id INTEGER PRIMARY KEY AUTOINCREMENT,
            season_year INTEGER NOT NULL,
            week INTEGER NOT NULL,
            record_type TEXT NOT NULL,
            team_id INTEGER NULL,
            matchup_id INTEGER NULL,
            value REAL NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_league_records_season ON league_records(season_year);

        CREATE TABLE IF NOT EXISTS analytics_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            season_year INTEGER NOT NULL,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            teams_written INTEGER NOT NULL,
            records_written INTEGER NOT NULL,
            error TEXT NULL
        );
        "#,
    )?;
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub seasons: usize,
    pub teams: usize,
    pub matchups: usize,
}

/// Upserts every row of the snapshot in one transaction.
pub fn import_snapshot(conn: &mut Connection, snapshot: &LeagueSnapshot) -> Result<ImportSummary> {
    let tx = conn.transaction()?;
    for season in &snapshot.seasons {
        upsert_season(&tx, season)?;
    }
    for team in &snapshot.teams {
        upsert_team(&tx, team)?;
    }
    for matchup in &snapshot.matchups {
        upsert_matchup(&tx, matchup)?;
    }
    tx.commit()?;
    Ok(ImportSummary {
        seasons: snapshot.seasons.len(),
        teams: snapshot.teams.len(),
        matchups: snapshot.matchups.len(),
    })
}

pub fn upsert_season(tx: &Transaction<'_>, s: &Season) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO seasons(year, league_name, regular_season_weeks, is_legacy, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(year) DO UPDATE SET
            league_name = excluded.league_name,
            regular_season_weeks = excluded.regular_season_weeks,
            is_legacy = excluded.is_legacy,
            updated_at = excluded.updated_at
        "#,
        params![
            s.year,
            s.league_name,
            s.regular_season_weeks as i64,
            bool_to_i64(s.is_legacy),
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

pub fn upsert_team(tx: &Transaction<'_>, t: &Team) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO teams(
            id, season_year, franchise_id, owner_name, team_name,
            wins, losses, ties, points_for, points_against, final_standing, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(id) DO UPDATE SET
            season_year = excluded.season_year,
            franchise_id = excluded.franchise_id,
            owner_name = excluded.owner_name,
            team_name = excluded.team_name,
            wins = excluded.wins,
            losses = excluded.losses,
            ties = excluded.ties,
            points_for = excluded.points_for,
            points_against = excluded.points_against,
            final_standing = excluded.final_standing,
            updated_at = excluded.updated_at
        "#,
        params![
            t.id,
            t.season_year,
            t.franchise_id,
            t.owner_name,
            t.team_name,
            t.wins as i64,
            t.losses as i64,
            t.ties as i64,
            t.points_for,
            t.points_against,
            t.final_standing.map(|s| s as i64),
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

pub fn upsert_matchup(tx: &Transaction<'_>, m: &Matchup) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO matchups(
            id, season_year, week, home_team_id, away_team_id,
            home_score, away_score, is_playoff, is_bye, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(id) DO UPDATE SET
            season_year = excluded.season_year,
            week = excluded.week,
            home_team_id = excluded.home_team_id,
            away_team_id = excluded.away_team_id,
            home_score = excluded.home_score,
            away_score = excluded.away_score,
            is_playoff = excluded.is_playoff,
            is_bye = excluded.is_bye,
            updated_at = excluded.updated_at
        "#,
        params![
            m.id,
            m.season_year,
            m.week as i64,
            m.home_team_id,
            m.away_team_id,
            m.home_score,
            m.away_score,
            bool_to_i64(m.is_playoff),
            bool_to_i64(m.is_bye),
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

pub fn load_seasons(conn: &Connection) -> Result<Vec<Season>> {
    let mut stmt = conn.prepare(
        "SELECT year, league_name, regular_season_weeks, is_legacy FROM seasons ORDER BY year ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Season {
            year: row.get(0)?,
            league_name: row.get(1)?,
            regular_season_weeks: row.get::<_, i64>(2)?.max(0) as u32,
            is_legacy: row.get::<_, i64>(3)? != 0,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

const TEAM_COLUMNS: &str = "id, season_year, franchise_id, owner_name, team_name, wins, losses, ties, \
     points_for, points_against, final_standing";

fn team_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        season_year: row.get(1)?,
        franchise_id: row.get(2)?,
        owner_name: row.get(3)?,
        team_name: row.get(4)?,
        wins: row.get::<_, i64>(5)?.max(0) as u32,
        losses: row.get::<_, i64>(6)?.max(0) as u32,
        ties: row.get::<_, i64>(7)?.max(0) as u32,
        points_for: row.get(8)?,
        points_against: row.get(9)?,
        final_standing: row.get::<_, Option<i64>>(10)?.map(|s| s.max(0) as u32),
    })
}

const MATCHUP_COLUMNS: &str =
    "id, season_year, week, home_team_id, away_team_id, home_score, away_score, is_playoff, is_bye";

fn matchup_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Matchup> {
    Ok(Matchup {
        id: row.get(0)?,
        season_year: row.get(1)?,
        week: row.get::<_, i64>(2)?.max(0) as u32,
        home_team_id: row.get(3)?,
        away_team_id: row.get(4)?,
        home_score: row.get(5)?,
        away_score: row.get(6)?,
        is_playoff: row.get::<_, i64>(7)? != 0,
        is_bye: row.get::<_, i64>(8)? != 0,
    })
}

pub fn load_teams(conn: &Connection, year: Option<i32>) -> Result<Vec<Team>> {
    let sql = format!(
        "SELECT {TEAM_COLUMNS} FROM teams WHERE (?1 IS NULL OR season_year = ?1) ORDER BY season_year ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![year], team_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn load_matchups(conn: &Connection, year: Option<i32>) -> Result<Vec<Matchup>> {
    let sql = format!(
        "SELECT {MATCHUP_COLUMNS} FROM matchups WHERE (?1 IS NULL OR season_year = ?1) \
         ORDER BY season_year ASC, week ASC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![year], matchup_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Every season, team and matchup.
pub fn load_snapshot(conn: &Connection) -> Result<LeagueSnapshot> {
    Ok(LeagueSnapshot {
        seasons: load_seasons(conn)?,
        teams: load_teams(conn, None)?,
        matchups: load_matchups(conn, None)?,
    })
}

pub fn load_season(conn: &Connection, year: i32) -> Result<SeasonSnapshot> {
    let season = conn
        .query_row(
            "SELECT year, league_name, regular_season_weeks, is_legacy FROM seasons WHERE year = ?1",
            params![year],
            |row| {
                Ok(Season {
                    year: row.get(0)?,
                    league_name: row.get(1)?,
                    regular_season_weeks: row.get::<_, i64>(2)?.max(0) as u32,
                    is_legacy: row.get::<_, i64>(3)? != 0,
                })
            },
        )
        .optional()?
        .ok_or(AnalyticsError::SeasonNotFound(year))?;
    let teams = load_teams(conn, Some(year))?;
    if teams.is_empty() {
        return Err(AnalyticsError::NoTeams(year));
    }
    let matchups = load_matchups(conn, Some(year))?;
    Ok(SeasonSnapshot {
        season,
        teams,
        matchups,
    })
}

/// Swaps a season's derived rows in one IMMEDIATE transaction. The write
/// lock is taken up front, so two recomputes of the same season serialize
/// and readers never see the season half-written.
pub fn replace_season_analytics(
    conn: &mut Connection,
    year: i32,
    stats: &[TeamSeasonStats],
    records: &[LeagueRecord],
) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let removed_stats = tx.execute(
        "DELETE FROM team_season_stats WHERE season_year = ?1",
        params![year],
    )?;
    let removed_records = tx.execute(
        "DELETE FROM league_records WHERE season_year = ?1",
        params![year],
    )?;
    debug!(year, removed_stats, removed_records, "cleared derived rows");

    {
        let mut insert_stats = tx.prepare(
            r#"
            INSERT INTO team_season_stats(
                season_year, team_id, points_for, points_against,
                actual_wins, actual_losses, actual_ties,
                power_wins, power_losses, power_ties,
                median_wins, median_losses, median_ties,
                combined_wins, combined_losses, combined_ties,
                actual_rank, power_rank, median_rank, combined_rank
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
        )?;
        for s in stats {
            insert_stats.execute(params![
                s.season_year,
                s.team_id,
                s.points_for,
                s.points_against,
                s.actual.wins as i64,
                s.actual.losses as i64,
                s.actual.ties as i64,
                s.power.wins as i64,
                s.power.losses as i64,
                s.power.ties as i64,
                s.median.wins as i64,
                s.median.losses as i64,
                s.median.ties as i64,
                s.combined.wins as i64,
                s.combined.losses as i64,
                s.combined.ties as i64,
                s.actual_rank as i64,
                s.power_rank as i64,
                s.median_rank as i64,
                s.combined_rank as i64
            ])?;
        }

        let mut insert_record = tx.prepare(
            r#"
            INSERT INTO league_records(season_year, week, record_type, team_id, matchup_id, value)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )?;
        for r in records {
            insert_record.execute(params![
                r.season_year,
                r.week as i64,
                r.record_type.as_str(),
                r.team_id,
                r.matchup_id,
                r.value
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn record_at(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Record> {
    Ok(Record {
        wins: row.get::<_, i64>(base)?.max(0) as u32,
        losses: row.get::<_, i64>(base + 1)?.max(0) as u32,
        ties: row.get::<_, i64>(base + 2)?.max(0) as u32,
    })
}

/// Stored rows, actual rank first. `None` loads every season.
pub fn load_team_season_stats(conn: &Connection, year: Option<i32>) -> Result<Vec<TeamSeasonStats>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT
            season_year, team_id, points_for, points_against,
            actual_wins, actual_losses, actual_ties,
            power_wins, power_losses, power_ties,
            median_wins, median_losses, median_ties,
            combined_wins, combined_losses, combined_ties,
            actual_rank, power_rank, median_rank, combined_rank
        FROM team_season_stats
        WHERE (?1 IS NULL OR season_year = ?1)
        ORDER BY season_year ASC, actual_rank ASC, team_id ASC
        "#,
    )?;
    let rows = stmt.query_map(params![year], |row| {
        Ok(TeamSeasonStats {
            season_year: row.get(0)?,
            team_id: row.get(1)?,
            points_for: row.get(2)?,
            points_against: row.get(3)?,
            actual: record_at(row, 4)?,
            power: record_at(row, 7)?,
            median: record_at(row, 10)?,
            combined: record_at(row, 13)?,
            actual_rank: row.get::<_, i64>(16)?.max(0) as u32,
            power_rank: row.get::<_, i64>(17)?.max(0) as u32,
            median_rank: row.get::<_, i64>(18)?.max(0) as u32,
            combined_rank: row.get::<_, i64>(19)?.max(0) as u32,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Combined rank per team, every season.
pub fn load_combined_ranks(conn: &Connection) -> Result<HashMap<TeamId, u32>> {
    Ok(load_team_season_stats(conn, None)?
        .into_iter()
        .map(|s| (s.team_id, s.combined_rank))
        .collect())
}

pub fn load_league_records(conn: &Connection, year: i32) -> Result<Vec<LeagueRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT season_year, week, record_type, team_id, matchup_id, value
        FROM league_records
        WHERE season_year = ?1
        ORDER BY record_id ASC
        "#,
    )?;
    let rows = stmt.query_map(params![year], |row| {
        let raw: String = row.get(2)?;
        Ok((
            LeagueRecord {
                season_year: row.get(0)?,
                week: row.get::<_, i64>(1)?.max(0) as u32,
                record_type: RecordType::HighestScore,
                team_id: row.get(3)?,
                matchup_id: row.get(4)?,
                value: row.get(5)?,
            },
            raw,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (mut record, raw) = row?;
        let Some(record_type) = RecordType::parse(&raw) else {
            debug!(raw = %raw, "skipping league record with unknown type");
            continue;
        };
        record.record_type = record_type;
        out.push(record);
    }
    Ok(out)
}

pub fn begin_run(conn: &Connection, year: i32) -> Result<i64> {
    conn.execute(
        "INSERT INTO analytics_runs(season_year, started_at, finished_at, teams_written, records_written)
         VALUES (?1, ?2, NULL, 0, 0)",
        params![year, Utc::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn finish_run(conn: &Connection, run_id: i64, teams_written: usize, records_written: usize) -> Result<()> {
    conn.execute(
        "UPDATE analytics_runs
         SET finished_at = ?1, teams_written = ?2, records_written = ?3
         WHERE run_id = ?4",
        params![
            Utc::now().to_rfc3339(),
            teams_written as i64,
            records_written as i64,
            run_id
        ],
    )?;
    Ok(())
}

/// Closes a run that wrote nothing.
pub fn fail_run(conn: &Connection, run_id: i64, error: &str) -> Result<()> {
    conn.execute(
        "UPDATE analytics_runs SET finished_at = ?1, error = ?2 WHERE run_id = ?3",
        params![Utc::now().to_rfc3339(), error, run_id],
    )?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsRun {
    pub run_id: i64,
    pub season_year: i32,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub teams_written: usize,
    pub records_written: usize,
    pub error: Option<String>,
}

pub fn load_runs(conn: &Connection) -> Result<Vec<AnalyticsRun>> {
    let mut stmt = conn.prepare(
        "SELECT run_id, season_year, started_at, finished_at, teams_written, records_written, error
         FROM analytics_runs ORDER BY run_id ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AnalyticsRun {
            run_id: row.get(0)?,
            season_year: row.get(1)?,
            started_at: row.get(2)?,
            finished_at: row.get(3)?,
            teams_written: row.get::<_, i64>(4)?.max(0) as usize,
            records_written: row.get::<_, i64>(5)?.max(0) as usize,
            error: row.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn bool_to_i64(v: bool) -> i64 {
    if v { 1 } else { 0 }
}
