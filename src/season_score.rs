use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Team, TeamId};
use crate::score_index::SeasonScores;
use crate::stats;

const W_REG: f64 = 0.20;
const W_PTS: f64 = 0.35;
const W_ALL: f64 = 0.35;
const W_FIN: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonScoreParts {
    pub r_reg: f64,
    pub r_pts: f64,
    pub p_all: f64,
    pub r_fin: f64,
}

impl SeasonScoreParts {
    pub fn score(&self) -> f64 {
        stats::round2(
            100.0 * (W_REG * self.r_reg + W_PTS * self.r_pts + W_ALL * self.p_all + W_FIN * self.r_fin),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonScore {
    pub team_id: TeamId,
    pub team_name: String,
    pub parts: SeasonScoreParts,
    pub season_score: f64,
}

pub fn finish_weight(final_standing: Option<u32>) -> f64 {
    match final_standing {
        Some(1) => 1.0,
        Some(2) => 0.8,
        Some(3) => 0.6,
        Some(4) => 0.5,
        _ => 0.3,
    }
}

/// 1-based positions: by wins then points-for, and by points-for alone.
fn rank_maps(teams: &[&Team]) -> (HashMap<TeamId, usize>, HashMap<TeamId, usize>) {
    let mut by_wins = teams.to_vec();
    by_wins.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| stats::desc(a.points_for, b.points_for))
    });
    let mut by_points = teams.to_vec();
    by_points.sort_by(|a, b| stats::desc(a.points_for, b.points_for));

    let positions = |order: Vec<&Team>| {
        order
            .into_iter()
            .enumerate()
            .map(|(idx, t)| (t.id, idx + 1))
            .collect::<HashMap<_, _>>()
    };
    (positions(by_wins), positions(by_points))
}

/// Scores every team of one season. `scores` should be the season's
/// regular-season index.
pub fn season_scores(teams: &[Team], scores: &SeasonScores) -> Vec<SeasonScore> {
    let mut teams = teams.iter().collect::<Vec<_>>();
    teams.sort_by_key(|t| t.id);
    let n = teams.len();
    let (reg_ranks, pts_ranks) = rank_maps(&teams);

    teams
        .into_iter()
        .map(|t| {
            let parts = SeasonScoreParts {
                r_reg: stats::rank_fraction(reg_ranks.get(&t.id).copied().unwrap_or(n), n),
                r_pts: stats::rank_fraction(pts_ranks.get(&t.id).copied().unwrap_or(n), n),
                p_all: scores.team_all_play(t.id).pct(),
                r_fin: finish_weight(t.final_standing()),
            };
            SeasonScore {
                team_id: t.id,
                team_name: t.team_name.clone(),
                parts,
                season_score: parts.score(),
            }
        })
        .collect()
}
