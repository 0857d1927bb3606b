use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

pub type TeamId = i64;
pub type MatchupId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub year: i32,
    #[serde(default)]
    pub league_name: String,
    pub regular_season_weeks: u32,
    #[serde(default)]
    pub is_legacy: bool,
}

/// One franchise's instance within a single season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub season_year: i32,
    /// Stable franchise identity when the importer knows it. Falls back to the
    /// normalized owner name (see `franchise::FranchiseKey`).
    #[serde(default)]
    pub franchise_id: Option<String>,
    #[serde(default)]
    pub owner_name: String,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    pub points_for: f64,
    #[serde(default)]
    pub points_against: f64,
    #[serde(default)]
    pub final_standing: Option<u32>,
}

impl Team {
    pub fn record(&self) -> Record {
        Record {
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    pub fn final_standing(&self) -> Option<u32> {
        self.final_standing.filter(|s| *s > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub id: MatchupId,
    pub season_year: i32,
    pub week: u32,
    pub home_team_id: TeamId,
    #[serde(default)]
    pub away_team_id: Option<TeamId>,
    pub home_score: f64,
    #[serde(default)]
    pub away_score: f64,
    #[serde(default)]
    pub is_playoff: bool,
    #[serde(default)]
    pub is_bye: bool,
}

impl Matchup {
    /// Unplayed rows carry 0-0.
    pub fn is_placeholder(&self) -> bool {
        self.home_score == 0.0 && self.away_score == 0.0
    }

    /// Both sides present, not a bye, and at least one score recorded.
    pub fn is_contested(&self) -> bool {
        !self.is_bye
            && self
                .away_team_id
                .is_some_and(|away| away != self.home_team_id)
            && !self.is_placeholder()
    }

    pub fn margin(&self) -> f64 {
        (self.home_score - self.away_score).abs()
    }

    pub fn combined(&self) -> f64 {
        self.home_score + self.away_score
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == Some(team_id)
    }

    pub fn score_for(&self, team_id: TeamId) -> Option<f64> {
        if self.home_team_id == team_id {
            Some(self.home_score)
        } else if self.away_team_id == Some(team_id) {
            Some(self.away_score)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Ties count in the denominator only. No games means 0.
    pub fn win_pct(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            0.0
        } else {
            self.wins as f64 / games as f64
        }
    }

    pub fn display(&self) -> String {
        if self.ties > 0 {
            format!("{}-{}-{}", self.wins, self.losses, self.ties)
        } else {
            format!("{}-{}", self.wins, self.losses)
        }
    }
}

impl AddAssign for Record {
    fn add_assign(&mut self, rhs: Self) {
        self.wins += rhs.wins;
        self.losses += rhs.losses;
        self.ties += rhs.ties;
    }
}

/// Derived per-team, per-season row written by the ranking engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonStats {
    pub season_year: i32,
    pub team_id: TeamId,
    pub points_for: f64,
    pub points_against: f64,
    pub actual: Record,
    pub power: Record,
    pub median: Record,
    pub combined: Record,
    pub actual_rank: u32,
    pub power_rank: u32,
    pub median_rank: u32,
    pub combined_rank: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    HighestScore,
    LowestScore,
    Blowout,
    Nailbiter,
}

impl RecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::HighestScore => "highest_score",
            RecordType::LowestScore => "lowest_score",
            RecordType::Blowout => "blowout",
            RecordType::Nailbiter => "nailbiter",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "highest_score" => Some(RecordType::HighestScore),
            "lowest_score" => Some(RecordType::LowestScore),
            "blowout" => Some(RecordType::Blowout),
            "nailbiter" => Some(RecordType::Nailbiter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueRecord {
    pub season_year: i32,
    pub week: u32,
    pub record_type: RecordType,
    pub team_id: Option<TeamId>,
    pub matchup_id: Option<MatchupId>,
    pub value: f64,
}

/// Immutable read snapshot the engines compute over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub seasons: Vec<Season>,
    pub teams: Vec<Team>,
    pub matchups: Vec<Matchup>,
}

#[derive(Debug, Clone)]
pub struct SeasonSnapshot {
    pub season: Season,
    pub teams: Vec<Team>,
    pub matchups: Vec<Matchup>,
}

impl LeagueSnapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn season_years(&self) -> Vec<i32> {
        let mut years = self.seasons.iter().map(|s| s.year).collect::<Vec<_>>();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn season(&self, year: i32) -> Result<SeasonSnapshot> {
        let season = self
            .seasons
            .iter()
            .find(|s| s.year == year)
            .cloned()
            .ok_or(AnalyticsError::SeasonNotFound(year))?;
        let mut teams = self
            .teams
            .iter()
            .filter(|t| t.season_year == year)
            .cloned()
            .collect::<Vec<_>>();
        if teams.is_empty() {
            return Err(AnalyticsError::NoTeams(year));
        }
        teams.sort_by_key(|t| t.id);
        let mut matchups = self
            .matchups
            .iter()
            .filter(|m| m.season_year == year)
            .cloned()
            .collect::<Vec<_>>();
        matchups.sort_by_key(|m| (m.week, m.id));
        Ok(SeasonSnapshot {
            season,
            teams,
            matchups,
        })
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }
}

impl SeasonSnapshot {
    pub fn year(&self) -> i32 {
        self.season.year
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_pct_guards_zero_games() {
        assert_eq!(Record::default().win_pct(), 0.0);
        let r = Record {
            wins: 3,
            losses: 1,
            ties: 0,
        };
        assert!((r.win_pct() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn record_display_hides_zero_ties() {
        let r = Record {
            wins: 8,
            losses: 5,
            ties: 0,
        };
        assert_eq!(r.display(), "8-5");
        let r = Record { ties: 1, ..r };
        assert_eq!(r.display(), "8-5-1");
    }

    #[test]
    fn record_type_names_match_storage() {
        for ty in [
            RecordType::HighestScore,
            RecordType::LowestScore,
            RecordType::Blowout,
            RecordType::Nailbiter,
        ] {
            assert_eq!(RecordType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(RecordType::parse("shootout"), None);
    }

    #[test]
    fn missing_season_is_not_found() {
        let snap = LeagueSnapshot::default();
        assert!(matches!(
            snap.season(2020),
            Err(AnalyticsError::SeasonNotFound(2020))
        ));
    }
}
