//! Per-season, per-week score lookups built once from matchup rows.
//!
//! Every comparison that needs "each team's score this week" goes through
//! [`SeasonScores::score_or_average`], so a team without a recorded score
//! (bye, missing row) is always stood in for by its own average, or 0 when
//! it has no scores at all.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalyticsConfig;
use crate::model::{Matchup, TeamId};

/// Which matchup rows feed an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexFilter {
    pub max_week: Option<u32>,
    pub include_playoffs: bool,
    pub include_byes: bool,
}

impl IndexFilter {
    /// Rows behind the stored standings.
    pub fn standings(cfg: &AnalyticsConfig) -> Self {
        Self {
            max_week: Some(cfg.max_standings_week),
            include_playoffs: cfg.standings_include_playoffs,
            include_byes: false,
        }
    }

    /// Non-playoff games of any week. Luck, season score and franchise
    /// all-play use this.
    pub fn regular_season() -> Self {
        Self {
            max_week: None,
            include_playoffs: false,
            include_byes: false,
        }
    }

    /// Every played game, playoffs included.
    pub fn all_games() -> Self {
        Self {
            max_week: None,
            include_playoffs: true,
            include_byes: false,
        }
    }

    fn admits(&self, m: &Matchup) -> bool {
        if self.max_week.is_some_and(|max| m.week > max) {
            return false;
        }
        if m.is_playoff && !self.include_playoffs {
            return false;
        }
        if m.is_bye && !self.include_byes {
            return false;
        }
        !m.is_placeholder()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeekScores {
    by_team: BTreeMap<TeamId, f64>,
    all: Vec<f64>,
}

impl WeekScores {
    pub fn score(&self, team: TeamId) -> Option<f64> {
        self.by_team.get(&team).copied()
    }

    /// Both sides of every admitted matchup, duplicates kept.
    pub fn all(&self) -> &[f64] {
        &self.all
    }

    pub fn recorded(&self) -> impl Iterator<Item = (TeamId, f64)> + '_ {
        self.by_team.iter().map(|(id, s)| (*id, *s))
    }

    pub fn recorded_scores(&self) -> Vec<f64> {
        self.by_team.values().copied().collect()
    }

    fn push(&mut self, team: TeamId, score: f64) {
        self.by_team.insert(team, score);
        self.all.push(score);
    }
}

/// All-play tally against a week's score list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AllPlay {
    pub wins: u32,
    pub losses: u32,
    /// Other scores that week (`len - 1`), whether or not they were beaten.
    pub opponents: u32,
}

impl AllPlay {
    pub fn pct(&self) -> f64 {
        if self.opponents == 0 {
            0.0
        } else {
            self.wins as f64 / self.opponents as f64
        }
    }
}

impl std::ops::AddAssign for AllPlay {
    fn add_assign(&mut self, rhs: Self) {
        self.wins += rhs.wins;
        self.losses += rhs.losses;
        self.opponents += rhs.opponents;
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeasonScores {
    weeks: BTreeMap<u32, WeekScores>,
    averages: HashMap<TeamId, f64>,
}

impl SeasonScores {
    pub fn weeks(&self) -> impl Iterator<Item = u32> + '_ {
        self.weeks.keys().copied()
    }

    pub fn week_count(&self) -> usize {
        self.weeks.len()
    }

    pub fn week(&self, week: u32) -> Option<&WeekScores> {
        self.weeks.get(&week)
    }

    pub fn score(&self, week: u32, team: TeamId) -> Option<f64> {
        self.weeks.get(&week).and_then(|w| w.score(team))
    }

    pub fn week_scores(&self, week: u32) -> &[f64] {
        self.weeks.get(&week).map(|w| w.all()).unwrap_or(&[])
    }

    /// Mean of the team's recorded scores in this index, 0 without any.
    pub fn team_average(&self, team: TeamId) -> f64 {
        self.averages.get(&team).copied().unwrap_or(0.0)
    }

    pub fn score_or_average(&self, week: u32, team: TeamId) -> f64 {
        self.score(week, team)
            .unwrap_or_else(|| self.team_average(team))
    }

    /// Weeks the team has a recorded score, ascending.
    pub fn team_scores(&self, team: TeamId) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.weeks
            .iter()
            .filter_map(move |(week, w)| w.score(team).map(|s| (*week, s)))
    }

    /// Compare `score` with every score recorded in `week`. The list
    /// includes the scorer's own entry, which is neither beaten nor lost to.
    pub fn all_play(&self, week: u32, score: f64) -> AllPlay {
        all_play_against(score, self.week_scores(week))
    }

    /// Summed all-play over every week the team has a recorded score.
    pub fn team_all_play(&self, team: TeamId) -> AllPlay {
        let mut total = AllPlay::default();
        for (week, score) in self.team_scores(team) {
            total += self.all_play(week, score);
        }
        total
    }

    fn finish(&mut self) {
        let mut sums: HashMap<TeamId, (f64, u32)> = HashMap::new();
        for week in self.weeks.values() {
            for (team, score) in week.recorded() {
                let entry = sums.entry(team).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
        }
        self.averages = sums
            .into_iter()
            .map(|(team, (sum, n))| (team, sum / n as f64))
            .collect();
    }
}

pub fn all_play_against(score: f64, week_scores: &[f64]) -> AllPlay {
    if week_scores.is_empty() {
        return AllPlay::default();
    }
    let wins = week_scores.iter().filter(|s| score > **s).count() as u32;
    let losses = week_scores.iter().filter(|s| score < **s).count() as u32;
    AllPlay {
        wins,
        losses,
        opponents: (week_scores.len() - 1) as u32,
    }
}

/// `season_year -> week -> team -> score`.
#[derive(Debug, Clone, Default)]
pub struct ScoreIndex {
    seasons: BTreeMap<i32, SeasonScores>,
}

impl ScoreIndex {
    pub fn build<'a>(matchups: impl IntoIterator<Item = &'a Matchup>, filter: IndexFilter) -> Self {
        let mut rows = matchups
            .into_iter()
            .filter(|m| filter.admits(m))
            .collect::<Vec<_>>();
        rows.sort_by_key(|m| (m.season_year, m.week, m.id));

        let mut seasons: BTreeMap<i32, SeasonScores> = BTreeMap::new();
        for m in rows {
            let week = seasons
                .entry(m.season_year)
                .or_default()
                .weeks
                .entry(m.week)
                .or_default();
            if m.is_bye {
                week.push(m.home_team_id, m.home_score);
                continue;
            }
            let Some(away) = m.away_team_id.filter(|away| *away != m.home_team_id) else {
                debug!(matchup_id = m.id, "skipping matchup without a distinct away team");
                continue;
            };
            week.push(m.home_team_id, m.home_score);
            week.push(away, m.away_score);
        }
        for season in seasons.values_mut() {
            season.weeks.retain(|_, w| !w.all.is_empty());
            season.finish();
        }
        Self { seasons }
    }

    pub fn season(&self, year: i32) -> Option<&SeasonScores> {
        self.seasons.get(&year)
    }

    /// Missing seasons read as empty.
    pub fn season_or_empty(&self, year: i32) -> SeasonScores {
        self.seasons.get(&year).cloned().unwrap_or_default()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.seasons.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: i64, week: u32, home: i64, away: i64, hs: f64, aws: f64) -> Matchup {
        Matchup {
            id,
            season_year: 2023,
            week,
            home_team_id: home,
            away_team_id: Some(away),
            home_score: hs,
            away_score: aws,
            is_playoff: false,
            is_bye: false,
        }
    }

    #[test]
    fn missing_week_uses_team_average() {
        let rows = vec![
            game(1, 1, 1, 2, 100.0, 80.0),
            game(2, 2, 1, 3, 120.0, 90.0),
            game(3, 2, 2, 4, 70.0, 60.0),
        ];
        let index = ScoreIndex::build(&rows, IndexFilter::regular_season());
        let season = index.season(2023).unwrap();
        assert_eq!(season.score_or_average(2, 1), 120.0);
        // Team 3 has no week 1 score; average of its only game.
        assert_eq!(season.score_or_average(1, 3), 90.0);
        // Unknown team falls back to 0.
        assert_eq!(season.score_or_average(1, 99), 0.0);
        assert_eq!(season.week_scores(2).len(), 4);
    }

    #[test]
    fn filter_drops_late_weeks_playoffs_and_placeholders() {
        let mut playoff = game(3, 15, 1, 2, 110.0, 100.0);
        playoff.is_playoff = true;
        let rows = vec![
            game(1, 1, 1, 2, 100.0, 80.0),
            game(2, 18, 1, 2, 100.0, 80.0),
            playoff,
            game(4, 3, 3, 4, 0.0, 0.0),
        ];
        let cfg = AnalyticsConfig::default();
        let standings = ScoreIndex::build(&rows, IndexFilter::standings(&cfg));
        let weeks = standings.season(2023).unwrap().weeks().collect::<Vec<_>>();
        assert_eq!(weeks, vec![1, 15]);

        let regular = ScoreIndex::build(&rows, IndexFilter::regular_season());
        let weeks = regular.season(2023).unwrap().weeks().collect::<Vec<_>>();
        assert_eq!(weeks, vec![1, 18]);
    }

    #[test]
    fn all_play_excludes_own_entry_from_opponents() {
        let tally = all_play_against(90.0, &[100.0, 90.0, 80.0, 70.0]);
        assert_eq!(tally.wins, 2);
        assert_eq!(tally.losses, 1);
        assert_eq!(tally.opponents, 3);
        assert!((tally.pct() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(all_play_against(90.0, &[90.0]).pct(), 0.0);
    }
}
