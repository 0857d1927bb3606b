//! Per-season award rows and the all-time record book.

use serde::{Deserialize, Serialize};

use crate::model::{LeagueRecord, LeagueSnapshot, Matchup, MatchupId, RecordType, TeamId};
use crate::stats;

#[derive(Debug, Clone, Copy)]
struct ScoreLine {
    week: u32,
    team_id: TeamId,
    score: f64,
}

/// Award rows for one season. Only contested regular-season games up to
/// `max_week` count; byes and 0-0 placeholders are skipped. Equal values keep
/// week order, home before away.
pub fn season_records(year: i32, matchups: &[Matchup], max_week: u32, top_n: usize) -> Vec<LeagueRecord> {
    let mut games = matchups
        .iter()
        .filter(|m| m.season_year == year && m.week <= max_week && !m.is_playoff && m.is_contested())
        .collect::<Vec<_>>();
    games.sort_by_key(|m| (m.week, m.id));
    if games.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(games.len() * 2);
    for m in &games {
        lines.push(ScoreLine {
            week: m.week,
            team_id: m.home_team_id,
            score: m.home_score,
        });
        if let Some(away) = m.away_team_id {
            lines.push(ScoreLine {
                week: m.week,
                team_id: away,
                score: m.away_score,
            });
        }
    }

    let score_record = |line: &ScoreLine, record_type| LeagueRecord {
        season_year: year,
        week: line.week,
        record_type,
        team_id: Some(line.team_id),
        matchup_id: None,
        value: line.score,
    };

    let mut out = Vec::new();
    let mut highest = lines.clone();
    highest.sort_by(|a, b| stats::desc(a.score, b.score));
    out.extend(
        highest
            .iter()
            .take(top_n)
            .map(|l| score_record(l, RecordType::HighestScore)),
    );

    let mut lowest = lines;
    lowest.sort_by(|a, b| a.score.total_cmp(&b.score));
    out.extend(
        lowest
            .iter()
            .take(top_n)
            .map(|l| score_record(l, RecordType::LowestScore)),
    );

    let matchup_record = |m: &Matchup, record_type| LeagueRecord {
        season_year: year,
        week: m.week,
        record_type,
        team_id: None,
        matchup_id: Some(m.id),
        value: m.margin(),
    };

    if let Some(m) = first_extreme(&games, |a, b| a > b) {
        out.push(matchup_record(m, RecordType::Blowout));
    }
    let decided = games
        .iter()
        .copied()
        .filter(|m| m.margin() > 0.0)
        .collect::<Vec<_>>();
    if let Some(m) = first_extreme(&decided, |a, b| a < b) {
        out.push(matchup_record(m, RecordType::Nailbiter));
    }
    out
}

/// First game whose margin strictly beats every earlier one.
fn first_extreme<'a>(games: &[&'a Matchup], better: impl Fn(f64, f64) -> bool) -> Option<&'a Matchup> {
    let mut best: Option<&Matchup> = None;
    for m in games {
        match best {
            Some(b) if !better(m.margin(), b.margin()) => {}
            _ => best = Some(*m),
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBookEntry {
    pub rank: usize,
    pub year: i32,
    pub week: u32,
    pub matchup_id: MatchupId,
    pub matchup: String,
    /// Set for individual score entries.
    pub team: Option<String>,
    pub value: f64,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBook {
    pub shootouts: Vec<RecordBookEntry>,
    pub snoozers: Vec<RecordBookEntry>,
    pub blowouts: Vec<RecordBookEntry>,
    pub nailbiters: Vec<RecordBookEntry>,
    pub top_scores: Vec<RecordBookEntry>,
    pub low_scores: Vec<RecordBookEntry>,
}

/// All-time extremes over every contested game, playoffs included.
pub fn record_book(snapshot: &LeagueSnapshot, top_n: usize) -> RecordBook {
    let mut games = snapshot
        .matchups
        .iter()
        .filter(|m| m.is_contested())
        .collect::<Vec<_>>();
    // Newest season first, then schedule order, for stable tie order.
    games.sort_by(|a, b| {
        b.season_year
            .cmp(&a.season_year)
            .then(a.week.cmp(&b.week))
            .then(a.id.cmp(&b.id))
    });

    let name = |id: TeamId| {
        snapshot
            .team(id)
            .map(|t| t.team_name.clone())
            .unwrap_or_else(|| format!("Team {id}"))
    };

    let mut game_rows = Vec::new();
    let mut margin_rows = Vec::new();
    let mut score_rows = Vec::new();
    for m in &games {
        let Some(away) = m.away_team_id else { continue };
        let matchup = format!("{} vs {}", name(m.home_team_id), name(away));
        let score = format!("{:.2} - {:.2}", m.home_score, m.away_score);
        let base = RecordBookEntry {
            rank: 0,
            year: m.season_year,
            week: m.week,
            matchup_id: m.id,
            matchup,
            team: None,
            value: m.combined(),
            detail: score,
        };
        margin_rows.push(RecordBookEntry {
            value: m.margin(),
            detail: format!("{:.2} pts", m.margin()),
            ..base.clone()
        });
        for (team, value) in [(m.home_team_id, m.home_score), (away, m.away_score)] {
            score_rows.push(RecordBookEntry {
                team: Some(name(team)),
                value,
                ..base.clone()
            });
        }
        game_rows.push(base);
    }

    let nailbiters = margin_rows
        .iter()
        .filter(|e| e.value > 0.0)
        .cloned()
        .collect::<Vec<_>>();

    RecordBook {
        shootouts: ranked(game_rows.clone(), top_n, true),
        snoozers: ranked(game_rows, top_n, false),
        blowouts: ranked(margin_rows, top_n, true),
        nailbiters: ranked(nailbiters, top_n, false),
        top_scores: ranked(score_rows.clone(), top_n, true),
        low_scores: ranked(score_rows, top_n, false),
    }
}

fn ranked(mut rows: Vec<RecordBookEntry>, top_n: usize, descending: bool) -> Vec<RecordBookEntry> {
    if descending {
        rows.sort_by(|a, b| stats::desc(a.value, b.value));
    } else {
        rows.sort_by(|a, b| a.value.total_cmp(&b.value));
    }
    rows.truncate(top_n);
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx + 1;
    }
    rows
}
