//! Four 0-100 notability scores for every played game in league history.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::model::{LeagueSnapshot, Matchup, MatchupId, Team, TeamId};
use crate::playoffs;
use crate::score_index::{IndexFilter, ScoreIndex, all_play_against};
use crate::stats;

/// Normalized inputs shared by every category, each in 0..=1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameFactors {
    pub combined_pct: f64,
    pub closeness_pct: f64,
    pub margin_pct: f64,
    pub winner_all_play: f64,
    pub loser_all_play: f64,
    pub winner_score_pct: f64,
    pub loser_score_pct: f64,
    pub importance: f64,
    pub winner_strength: f64,
    pub loser_strength: f64,
    pub upset: f64,
}

impl GameFactors {
    pub fn best(&self) -> f64 {
        score(
            0.35 * self.importance
                + 0.30 * self.closeness_pct
                + 0.20 * self.combined_pct
                + 0.10 * self.upset
                + 0.05 * self.winner_all_play
                + 0.05 * self.loser_all_play,
        )
    }

    pub fn worst(&self) -> f64 {
        score(
            0.40 * (1.0 - self.combined_pct)
                + 0.35 * self.margin_pct
                + 0.15 * (1.0 - self.winner_all_play.max(self.loser_all_play))
                + 0.10 * (1.0 - self.importance),
        )
    }

    pub fn brutal_loss(&self) -> f64 {
        score(
            0.30 * self.closeness_pct
                + 0.25 * self.loser_all_play
                + 0.25 * self.loser_score_pct
                + 0.20 * self.importance,
        )
    }

    pub fn pathetic_win(&self) -> f64 {
        score(
            0.40 * (1.0 - self.winner_all_play)
                + 0.30 * (1.0 - self.winner_score_pct)
                + 0.20 * (1.0 - self.loser_strength)
                + 0.10 * (1.0 - self.importance),
        )
    }
}

fn score(weighted: f64) -> f64 {
    stats::round2((100.0 * weighted).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotableGame {
    pub year: i32,
    pub week: u32,
    pub matchup_id: MatchupId,
    pub matchup: String,
    pub score: String,
    pub margin: f64,
    pub winner: String,
    pub loser: String,
    pub is_playoff: bool,
    pub score_value: f64,
    pub factors: GameFactors,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotableGames {
    pub best_games: Vec<NotableGame>,
    pub worst_games: Vec<NotableGame>,
    pub brutal_losses: Vec<NotableGame>,
    pub pathetic_wins: Vec<NotableGame>,
}

/// One game's factors before a category picks its weights.
#[derive(Debug, Clone)]
pub struct ScoredGame<'a> {
    pub matchup: &'a Matchup,
    pub winner: &'a Team,
    pub loser: &'a Team,
    pub factors: GameFactors,
}

#[derive(Default)]
struct WeekSpread {
    combined: Vec<f64>,
    margins: Vec<f64>,
}

/// Rank-based season strength, 1 is best. Teams without a combined rank
/// read as 0.5.
pub fn strength_percentile(rank: Option<u32>, season_ranks: &[u32]) -> f64 {
    let Some(rank) = rank else { return 0.5 };
    if season_ranks.is_empty() {
        return 0.5;
    }
    let worse = season_ranks.iter().filter(|r| **r > rank).count();
    (worse + 1) as f64 / (season_ranks.len() + 1) as f64
}

/// Computes factors for every contested game. `combined_ranks` maps team id
/// to its stored combined rank.
pub fn score_games<'a>(
    snapshot: &'a LeagueSnapshot,
    combined_ranks: &HashMap<TeamId, u32>,
    cfg: &AnalyticsConfig,
) -> Vec<ScoredGame<'a>> {
    let teams = snapshot
        .teams
        .iter()
        .map(|t| (t.id, t))
        .collect::<HashMap<_, _>>();
    let mut games = snapshot
        .matchups
        .iter()
        .filter(|m| m.is_contested())
        .filter(|m| m.away_team_id.is_some_and(|a| teams.contains_key(&a)) && teams.contains_key(&m.home_team_id))
        .collect::<Vec<_>>();
    games.sort_by(|a, b| {
        b.season_year
            .cmp(&a.season_year)
            .then(a.week.cmp(&b.week))
            .then(a.id.cmp(&b.id))
    });

    let index = ScoreIndex::build(games.iter().copied(), IndexFilter::all_games());
    let mut spreads: BTreeMap<(i32, u32), WeekSpread> = BTreeMap::new();
    for m in &games {
        let spread = spreads.entry((m.season_year, m.week)).or_default();
        spread.combined.push(m.combined());
        spread.margins.push(m.margin());
    }

    let mut season_teams: HashMap<i32, Vec<Team>> = HashMap::new();
    for t in &snapshot.teams {
        season_teams.entry(t.season_year).or_default().push(t.clone());
    }
    let mut season_ranks: HashMap<i32, Vec<u32>> = HashMap::new();
    for t in &snapshot.teams {
        if let Some(rank) = combined_ranks.get(&t.id) {
            season_ranks.entry(t.season_year).or_default().push(*rank);
        }
    }
    let regular_weeks = snapshot
        .seasons
        .iter()
        .map(|s| (s.year, s.regular_season_weeks))
        .collect::<HashMap<_, _>>();
    let mut playoff_weeks: HashMap<i32, Vec<u32>> = HashMap::new();
    let mut cutoffs: HashMap<i32, u32> = HashMap::new();

    let mut out = Vec::with_capacity(games.len());
    for m in games {
        let year = m.season_year;
        let Some(away_id) = m.away_team_id else { continue };
        let (Some(home), Some(away)) = (teams.get(&m.home_team_id), teams.get(&away_id)) else {
            continue;
        };
        let home_wins = m.home_score >= m.away_score;
        let (winner, loser, winner_score, loser_score) = if home_wins {
            (*home, *away, m.home_score, m.away_score)
        } else {
            (*away, *home, m.away_score, m.home_score)
        };

        let scores = index.season(year);
        let week_scores = scores.map(|s| s.week_scores(m.week)).unwrap_or(&[]);
        let empty = WeekSpread::default();
        let spread = spreads.get(&(year, m.week)).unwrap_or(&empty);

        let importance = if m.is_playoff {
            let weeks = playoff_weeks
                .entry(year)
                .or_insert_with(|| playoffs::playoff_weeks(&snapshot.matchups, year));
            playoffs::playoff_importance(weeks, m.week)
        } else {
            let reg = regular_weeks
                .get(&year)
                .copied()
                .filter(|w| *w > 0)
                .unwrap_or(cfg.default_regular_weeks);
            let cutoff = *cutoffs.entry(year).or_insert_with(|| {
                let teams = season_teams.get(&year).map(Vec::as_slice).unwrap_or(&[]);
                playoffs::playoff_cutoff_wins(teams, cfg.playoff_cutoff_seeds)
            });
            playoffs::regular_season_importance(reg, m.week, cutoff, winner.wins, loser.wins)
        };

        let ranks = season_ranks.get(&year).map(Vec::as_slice).unwrap_or(&[]);
        let winner_strength = strength_percentile(combined_ranks.get(&winner.id).copied(), ranks);
        let loser_strength = strength_percentile(combined_ranks.get(&loser.id).copied(), ranks);

        let margin_pct = stats::percentile(m.margin(), &spread.margins);
        let factors = GameFactors {
            combined_pct: stats::percentile(m.combined(), &spread.combined),
            closeness_pct: 1.0 - margin_pct,
            margin_pct,
            winner_all_play: all_play_against(winner_score, week_scores).pct(),
            loser_all_play: all_play_against(loser_score, week_scores).pct(),
            winner_score_pct: stats::percentile(winner_score, week_scores),
            loser_score_pct: stats::percentile(loser_score, week_scores),
            importance,
            winner_strength,
            loser_strength,
            upset: (loser_strength - winner_strength).max(0.0),
        };
        out.push(ScoredGame {
            matchup: m,
            winner,
            loser,
            factors,
        });
    }
    out
}

impl ScoredGame<'_> {
    fn to_notable(&self, snapshot: &LeagueSnapshot, score_value: f64) -> NotableGame {
        let m = self.matchup;
        let name = |id: Option<TeamId>| {
            id.and_then(|id| snapshot.team(id))
                .map(|t| t.team_name.clone())
                .unwrap_or_else(|| "TBD".to_string())
        };
        NotableGame {
            year: m.season_year,
            week: m.week,
            matchup_id: m.id,
            matchup: format!("{} vs {}", name(Some(m.home_team_id)), name(m.away_team_id)),
            score: format!("{:.2} - {:.2}", m.home_score, m.away_score),
            margin: m.margin(),
            winner: self.winner.team_name.clone(),
            loser: self.loser.team_name.clone(),
            is_playoff: m.is_playoff,
            score_value,
            factors: self.factors,
        }
    }
}

fn top_by(
    snapshot: &LeagueSnapshot,
    games: &[ScoredGame<'_>],
    top_n: usize,
    category: fn(&GameFactors) -> f64,
) -> Vec<NotableGame> {
    let mut scored = games
        .iter()
        .map(|g| g.to_notable(snapshot, category(&g.factors)))
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| stats::desc(a.score_value, b.score_value));
    scored.truncate(top_n);
    scored
}

pub fn notable_games(
    snapshot: &LeagueSnapshot,
    combined_ranks: &HashMap<TeamId, u32>,
    cfg: &AnalyticsConfig,
) -> NotableGames {
    let games = score_games(snapshot, combined_ranks, cfg);
    let n = cfg.notable_top_n;
    NotableGames {
        best_games: top_by(snapshot, &games, n, GameFactors::best),
        worst_games: top_by(snapshot, &games, n, GameFactors::worst),
        brutal_losses: top_by(snapshot, &games, n, GameFactors::brutal_loss),
        pathetic_wins: top_by(snapshot, &games, n, GameFactors::pathetic_win),
    }
}
