use serde::{Deserialize, Serialize};

use crate::model::{Team, TeamId};
use crate::score_index::SeasonScores;
use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuckEntry {
    pub team_id: TeamId,
    pub team_name: String,
    pub wins: u32,
    pub expected_wins: f64,
    /// Positive means the schedule was kind.
    pub luck_index: f64,
}

/// Fractional all-play wins summed over the team's weeks. A week with no
/// other scores adds nothing.
pub fn expected_wins(scores: &SeasonScores, team: TeamId) -> f64 {
    scores
        .team_scores(team)
        .map(|(week, score)| {
            let tally = scores.all_play(week, score);
            if tally.opponents == 0 {
                0.0
            } else {
                tally.wins as f64 / tally.opponents as f64
            }
        })
        .sum()
}

pub fn luck_for(team: &Team, scores: &SeasonScores) -> LuckEntry {
    let expected = expected_wins(scores, team.id);
    LuckEntry {
        team_id: team.id,
        team_name: team.team_name.clone(),
        wins: team.wins,
        expected_wins: expected,
        luck_index: team.wins as f64 - expected,
    }
}

/// Sorted luckiest first; ties keep team id order.
pub fn luck_index(teams: &[Team], scores: &SeasonScores) -> Vec<LuckEntry> {
    let mut teams = teams.iter().collect::<Vec<_>>();
    teams.sort_by_key(|t| t.id);
    let mut out = teams
        .into_iter()
        .map(|t| luck_for(t, scores))
        .collect::<Vec<_>>();
    out.sort_by(|a, b| stats::desc(a.luck_index, b.luck_index));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Matchup;
    use crate::score_index::{IndexFilter, ScoreIndex};

    fn team(id: i64, wins: u32, losses: u32) -> Team {
        Team {
            id,
            season_year: 2021,
            franchise_id: None,
            owner_name: String::new(),
            team_name: format!("t{id}"),
            wins,
            losses,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
            final_standing: None,
        }
    }

    fn game(id: i64, week: u32, home: i64, away: i64, hs: f64, aws: f64) -> Matchup {
        Matchup {
            id,
            season_year: 2021,
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
    fn second_best_score_losing_is_unlucky() {
        // Week 1: 100 beats 90, 80 beats 70. Team 2 lost with the
        // second-best score.
        let rows = vec![game(1, 1, 1, 2, 100.0, 90.0), game(2, 1, 3, 4, 80.0, 70.0)];
        let index = ScoreIndex::build(&rows, IndexFilter::regular_season());
        let scores = index.season(2021).unwrap();
        let teams = vec![team(1, 1, 0), team(2, 0, 1), team(3, 1, 0), team(4, 0, 1)];

        let luck = luck_index(&teams, scores);
        let t2 = luck.iter().find(|e| e.team_id == 2).unwrap();
        assert!((t2.expected_wins - 2.0 / 3.0).abs() < 1e-12);
        assert!((t2.luck_index + 2.0 / 3.0).abs() < 1e-12);

        // Team 3 won with the third-best score: lucky.
        assert_eq!(luck[0].team_id, 3);
        assert!(luck.windows(2).all(|w| w[0].luck_index >= w[1].luck_index));
    }

    #[test]
    fn team_without_games_has_zero_expected() {
        let scores = SeasonScores::default();
        let entry = luck_for(&team(9, 2, 0), &scores);
        assert_eq!(entry.expected_wins, 0.0);
        assert_eq!(entry.luck_index, 2.0);
    }
}
