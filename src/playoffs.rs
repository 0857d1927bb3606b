use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Matchup, Team, TeamId};

/// Distinct playoff weeks of a season, ascending. Byes and placeholders
/// still mark a week as a playoff week.
pub fn playoff_weeks(matchups: &[Matchup], year: i32) -> Vec<u32> {
    let mut weeks = matchups
        .iter()
        .filter(|m| m.season_year == year && m.is_playoff)
        .map(|m| m.week)
        .collect::<Vec<_>>();
    weeks.sort_unstable();
    weeks.dedup();
    weeks
}

/// Final = 1.0, semi = 0.85, quarter = 0.7, earlier rounds 0.6. Zero when
/// the season has no playoff weeks.
pub fn playoff_importance(weeks: &[u32], week: u32) -> f64 {
    if weeks.is_empty() {
        return 0.0;
    }
    let Some(idx) = weeks.iter().position(|w| *w == week) else {
        return 0.6;
    };
    match weeks.len() - 1 - idx {
        0 => 1.0,
        1 => 0.85,
        2 => 0.7,
        _ => 0.6,
    }
}

/// Wins of the team holding the last playoff seed, ordering by
/// `wins - losses + 0.5 * ties` then points-for. Zero with too few teams.
pub fn playoff_cutoff_wins(teams: &[Team], cutoff_seeds: usize) -> u32 {
    if cutoff_seeds == 0 || teams.len() < cutoff_seeds {
        return 0;
    }
    let mut sorted = teams.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| {
        let key = |t: &Team| t.wins as f64 - t.losses as f64 + 0.5 * t.ties as f64;
        key(b)
            .total_cmp(&key(a))
            .then_with(|| b.points_for.total_cmp(&a.points_for))
    });
    sorted[cutoff_seeds - 1].wins
}

pub fn bubble_weight(cutoff: u32, wins: u32) -> f64 {
    match cutoff.abs_diff(wins) {
        0 => 0.7,
        1 => 0.5,
        2 => 0.3,
        _ => 0.0,
    }
}

/// Regular-season games matter only in the final two weeks, and then by how
/// close either side sits to the cutoff.
pub fn regular_season_importance(
    regular_weeks: u32,
    week: u32,
    cutoff: u32,
    winner_wins: u32,
    loser_wins: u32,
) -> f64 {
    if week + 1 < regular_weeks {
        return 0.0;
    }
    bubble_weight(cutoff, winner_wins).max(bubble_weight(cutoff, loser_wins))
}

pub fn round_names(weeks: &[u32]) -> Vec<String> {
    let fixed: &[&str] = match weeks.len() {
        1 => &["Championship"],
        2 => &["Semi-Finals", "Championship"],
        3 => &["Quarter-Finals", "Semi-Finals", "Championship"],
        4 => &["Wild Card", "Quarter-Finals", "Semi-Finals", "Championship"],
        _ => &[],
    };
    if fixed.is_empty() {
        weeks.iter().map(|w| format!("Week {w}")).collect()
    } else {
        fixed.iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketGame {
    pub week: u32,
    pub home_team: String,
    pub home_score: f64,
    pub away_team: String,
    pub away_score: f64,
    pub winner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketRound {
    pub name: String,
    pub week: u32,
    pub games: Vec<BracketGame>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    pub rounds: Vec<BracketRound>,
}

fn seeded_label(teams: &[Team], id: Option<TeamId>) -> String {
    let Some(team) = id.and_then(|id| teams.iter().find(|t| t.id == id)) else {
        return "TBD".to_string();
    };
    match team.final_standing() {
        Some(seed) => format!("({seed}) {}", team.team_name),
        None => format!("(-) {}", team.team_name),
    }
}

pub fn playoff_bracket(year: i32, teams: &[Team], matchups: &[Matchup]) -> PlayoffBracket {
    let mut by_week: BTreeMap<u32, Vec<&Matchup>> = BTreeMap::new();
    for m in matchups
        .iter()
        .filter(|m| m.season_year == year && m.is_playoff)
    {
        by_week.entry(m.week).or_default().push(m);
    }
    let weeks = by_week.keys().copied().collect::<Vec<_>>();
    let names = round_names(&weeks);

    let rounds = by_week
        .into_iter()
        .zip(names)
        .map(|((week, mut games), name)| {
            games.sort_by_key(|m| m.id);
            let games = games
                .into_iter()
                .map(|m| {
                    let home = seeded_label(teams, Some(m.home_team_id));
                    let away = seeded_label(teams, m.away_team_id);
                    let winner = if m.away_team_id.is_none() || m.home_score == m.away_score {
                        "TBD".to_string()
                    } else if m.home_score > m.away_score {
                        home.clone()
                    } else {
                        away.clone()
                    };
                    BracketGame {
                        week,
                        home_team: home,
                        home_score: m.home_score,
                        away_team: away,
                        away_score: m.away_score,
                        winner,
                    }
                })
                .collect();
            BracketRound { name, week, games }
        })
        .collect();
    PlayoffBracket { rounds }
}
