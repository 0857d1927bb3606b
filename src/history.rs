use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::franchise::{self, FranchiseKey};
use crate::luck;
use crate::model::{LeagueSnapshot, Record};
use crate::score_index::{IndexFilter, ScoreIndex};
use crate::season_score;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trophy {
    Champion,
    RunnerUp,
    Third,
}

impl Trophy {
    pub fn from_standing(standing: Option<u32>) -> Option<Self> {
        match standing? {
            1 => Some(Trophy::Champion),
            2 => Some(Trophy::RunnerUp),
            3 => Some(Trophy::Third),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonHistory {
    pub year: i32,
    pub team_name: String,
    pub record: String,
    pub all_play_record: String,
    pub points_for: f64,
    pub points_for_avg: f64,
    pub points_against: f64,
    pub points_against_avg: f64,
    pub luck: f64,
    pub season_score: f64,
    pub final_standing: Option<u32>,
    pub trophy: Option<Trophy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub record: String,
    pub points_for: f64,
    pub playoff_appearances: usize,
    pub championships: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamHistory {
    pub key: FranchiseKey,
    pub team_name: String,
    pub owner_name: String,
    pub summary: HistorySummary,
    /// Newest season first.
    pub seasons: Vec<SeasonHistory>,
}

pub fn team_history(snapshot: &LeagueSnapshot, key: &str) -> Result<TeamHistory> {
    FranchiseKey::parse(key)?;
    let groups = franchise::group_by_franchise(&snapshot.teams);
    let (key, teams) = groups
        .into_iter()
        .find(|(k, _)| k.matches(key))
        .ok_or_else(|| AnalyticsError::FranchiseNotFound(key.trim().to_string()))?;
    let latest = teams
        .first()
        .ok_or_else(|| AnalyticsError::FranchiseNotFound(key.to_string()))?;

    let index = ScoreIndex::build(&snapshot.matchups, IndexFilter::regular_season());

    let mut seasons = Vec::with_capacity(teams.len());
    for team in &teams {
        let year = team.season_year;
        let scores = index.season_or_empty(year);
        let season_teams = snapshot
            .teams
            .iter()
            .filter(|t| t.season_year == year)
            .cloned()
            .collect::<Vec<_>>();
        let season_score = season_score::season_scores(&season_teams, &scores)
            .into_iter()
            .find(|s| s.team_id == team.id)
            .map(|s| s.season_score)
            .unwrap_or(0.0);
        let all_play = scores.team_all_play(team.id);
        let games = team.games() as f64;
        seasons.push(SeasonHistory {
            year,
            team_name: team.team_name.clone(),
            record: team.record().display(),
            all_play_record: format!("{}-{}", all_play.wins, all_play.losses),
            points_for: team.points_for,
            points_for_avg: stats::ratio(team.points_for, games),
            points_against: team.points_against,
            points_against_avg: stats::ratio(team.points_against, games),
            luck: luck::luck_for(team, &scores).luck_index,
            season_score,
            final_standing: team.final_standing(),
            trophy: Trophy::from_standing(team.final_standing()),
        });
    }

    let mut total = Record::default();
    for team in &teams {
        total += team.record();
    }
    let summary = HistorySummary {
        record: format!("{}-{}-{}", total.wins, total.losses, total.ties),
        points_for: teams.iter().map(|t| t.points_for).sum(),
        playoff_appearances: teams
            .iter()
            .filter(|t| t.final_standing().is_some_and(|s| s <= 4))
            .count(),
        championships: teams
            .iter()
            .filter(|t| t.final_standing() == Some(1))
            .count(),
    };

    Ok(TeamHistory {
        team_name: latest.team_name.clone(),
        owner_name: latest.owner_name.clone(),
        key,
        summary,
        seasons,
    })
}
