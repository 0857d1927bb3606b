use std::collections::HashMap;
use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use crate::config::AnalyticsConfig;
use crate::engine;
use crate::error::{AnalyticsError, Result};
use crate::franchise;
use crate::luck;
use crate::model::LeagueSnapshot;
use crate::notable::{self, NotableGame};
use crate::records::{self, RecordBookEntry};
use crate::score_index::{IndexFilter, ScoreIndex};
use crate::season_score;
use crate::standings::Tier;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub seasons: usize,
    pub standings: usize,
    pub luck: usize,
    pub season_scores: usize,
    pub franchises: usize,
    pub notable_games: usize,
    pub record_book: usize,
}

/// Writes every analytics view of the snapshot to one workbook. Seasons
/// that do not resolve are left out.
pub fn export_workbook(path: &Path, snapshot: &LeagueSnapshot, cfg: &AnalyticsConfig) -> Result<ExportReport> {
    let mut standings_rows = vec![header(&[
        "Season", "Team", "Owner", "Record", "PF", "PA", "Actual Rank", "Power", "Power Rank",
        "Median", "Median Rank", "Combined", "Combined Rank", "Tier",
    ])];
    let mut luck_rows = vec![header(&["Season", "Team", "Wins", "Expected Wins", "Luck"])];
    let mut score_rows = vec![header(&[
        "Season", "Team", "R_reg", "R_pts", "P_all", "R_fin", "Season Score",
    ])];

    let regular = ScoreIndex::build(&snapshot.matchups, IndexFilter::regular_season());
    let mut combined_ranks = HashMap::new();
    let mut seasons = 0usize;
    for year in snapshot.season_years() {
        let Ok(season) = snapshot.season(year) else {
            continue;
        };
        seasons += 1;
        let analytics = engine::compute_season_analytics(&season, cfg);
        let mut stats = analytics.stats;
        stats.sort_by_key(|s| s.actual_rank);
        for s in &stats {
            combined_ranks.insert(s.team_id, s.combined_rank);
            let team = season.team(s.team_id);
            standings_rows.push(vec![
                year.to_string(),
                team.map(|t| t.team_name.clone()).unwrap_or_default(),
                team.map(|t| t.owner_name.clone()).unwrap_or_default(),
                s.actual.display(),
                format!("{:.2}", s.points_for),
                format!("{:.2}", s.points_against),
                s.actual_rank.to_string(),
                s.power.display(),
                s.power_rank.to_string(),
                s.median.display(),
                s.median_rank.to_string(),
                s.combined.display(),
                s.combined_rank.to_string(),
                Tier::from_combined_rank(s.combined_rank).label().to_string(),
            ]);
        }

        let scores = regular.season_or_empty(year);
        for entry in luck::luck_index(&season.teams, &scores) {
            luck_rows.push(vec![
                year.to_string(),
                entry.team_name,
                entry.wins.to_string(),
                format!("{:.3}", entry.expected_wins),
                format!("{:.3}", entry.luck_index),
            ]);
        }
        for s in season_score::season_scores(&season.teams, &scores) {
            score_rows.push(vec![
                year.to_string(),
                s.team_name,
                format!("{:.3}", s.parts.r_reg),
                format!("{:.3}", s.parts.r_pts),
                format!("{:.3}", s.parts.p_all),
                format!("{:.2}", s.parts.r_fin),
                format!("{:.2}", s.season_score),
            ]);
        }
    }

    let mut franchise_rows = vec![header(&[
        "Franchise", "Owner", "Team", "Record", "Win %", "All-Play %", "PF Percentile",
        "Titles", "Runner-Ups", "Thirds", "Rating", "Seasons",
    ])];
    for f in franchise::franchise_ratings(snapshot) {
        franchise_rows.push(vec![
            f.key.to_string(),
            f.owner_name,
            f.team_name,
            f.record.display(),
            format!("{:.3}", f.inputs.win_pct),
            format!("{:.3}", f.inputs.all_play_pct),
            format!("{:.3}", f.inputs.pf_percentile),
            f.inputs.championships.to_string(),
            f.inputs.runner_ups.to_string(),
            f.inputs.thirds.to_string(),
            f.league_rating.to_string(),
            f.seasons_played.to_string(),
        ]);
    }

    let mut notable_rows = vec![header(&[
        "Category", "Season", "Week", "Matchup", "Score", "Winner", "Loser", "Value",
    ])];
    let games = notable::notable_games(snapshot, &combined_ranks, cfg);
    for (category, list) in [
        ("Best", &games.best_games),
        ("Worst", &games.worst_games),
        ("Brutal Loss", &games.brutal_losses),
        ("Pathetic Win", &games.pathetic_wins),
    ] {
        notable_rows.extend(list.iter().map(|g| notable_row(category, g)));
    }

    let mut book_rows = vec![header(&[
        "Category", "Rank", "Season", "Week", "Matchup", "Team", "Value", "Detail",
    ])];
    let book = records::record_book(snapshot, cfg.record_book_top_n);
    for (category, list) in [
        ("Shootouts", &book.shootouts),
        ("Snoozers", &book.snoozers),
        ("Blowouts", &book.blowouts),
        ("Nailbiters", &book.nailbiters),
        ("Top Scores", &book.top_scores),
        ("Low Scores", &book.low_scores),
    ] {
        book_rows.extend(list.iter().map(|e| book_row(category, e)));
    }

    let mut workbook = Workbook::new();
    for (name, rows) in [
        ("Standings", &standings_rows),
        ("Luck", &luck_rows),
        ("SeasonScores", &score_rows),
        ("Franchises", &franchise_rows),
        ("NotableGames", &notable_rows),
        ("RecordBook", &book_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(xlsx(name))?;
        write_rows(sheet, rows).map_err(xlsx(name))?;
    }
    workbook
        .save(path)
        .map_err(|err| AnalyticsError::Export(format!("write {}: {err}", path.display())))?;

    Ok(ExportReport {
        seasons,
        standings: standings_rows.len().saturating_sub(1),
        luck: luck_rows.len().saturating_sub(1),
        season_scores: score_rows.len().saturating_sub(1),
        franchises: franchise_rows.len().saturating_sub(1),
        notable_games: notable_rows.len().saturating_sub(1),
        record_book: book_rows.len().saturating_sub(1),
    })
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn notable_row(category: &str, g: &NotableGame) -> Vec<String> {
    vec![
        category.to_string(),
        g.year.to_string(),
        g.week.to_string(),
        g.matchup.clone(),
        g.score.clone(),
        g.winner.clone(),
        g.loser.clone(),
        format!("{:.2}", g.score_value),
    ]
}

fn book_row(category: &str, e: &RecordBookEntry) -> Vec<String> {
    vec![
        category.to_string(),
        e.rank.to_string(),
        e.year.to_string(),
        e.week.to_string(),
        e.matchup.clone(),
        e.team.clone().unwrap_or_default(),
        format!("{:.2}", e.value),
        e.detail.clone(),
    ]
}

fn xlsx(sheet: &str) -> impl Fn(XlsxError) -> AnalyticsError + '_ {
    move |err| AnalyticsError::Export(format!("sheet {sheet}: {err}"))
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> std::result::Result<(), XlsxError> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet.write_string(row_idx as u32, col_idx as u16, value)?;
        }
    }
    Ok(())
}
