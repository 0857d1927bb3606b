//! The four standings systems share one pass: a seed record, a per-week
//! rule, then the same win%/points-for ordering.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Record, Team, TeamId, TeamSeasonStats};
use crate::score_index::SeasonScores;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingKind {
    Actual,
    Power,
    Median,
    Combined,
}

impl StandingKind {
    pub const ALL: [StandingKind; 4] = [
        StandingKind::Actual,
        StandingKind::Power,
        StandingKind::Median,
        StandingKind::Combined,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StandingKind::Actual => "Actual",
            StandingKind::Power => "Power",
            StandingKind::Median => "Median",
            StandingKind::Combined => "Combined",
        }
    }

    fn seed(self, team: &Team) -> Record {
        match self {
            StandingKind::Actual | StandingKind::Combined => team.record(),
            StandingKind::Power | StandingKind::Median => Record::default(),
        }
    }

    fn weekly_rule(self) -> Option<WeekRule> {
        match self {
            StandingKind::Actual => None,
            StandingKind::Power => Some(power_week),
            StandingKind::Median | StandingKind::Combined => Some(median_week),
        }
    }
}

/// What a weekly rule sees: one week of one season, every team in it.
pub struct WeekContext<'a> {
    pub scores: &'a SeasonScores,
    pub week: u32,
    pub team_ids: &'a [TeamId],
    pub median: Option<f64>,
}

impl<'a> WeekContext<'a> {
    pub fn new(scores: &'a SeasonScores, week: u32, team_ids: &'a [TeamId]) -> Self {
        let recorded = scores
            .week(week)
            .map(|w| w.recorded_scores())
            .unwrap_or_default();
        Self {
            scores,
            week,
            team_ids,
            median: stats::median(&recorded),
        }
    }
}

pub type WeekRule = fn(&WeekContext<'_>, TeamId) -> Record;

/// Every team against every other team's score that week. Teams without a
/// score play at their average. Equal scores are not counted.
pub fn power_week(ctx: &WeekContext<'_>, team: TeamId) -> Record {
    let own = ctx.scores.score_or_average(ctx.week, team);
    let mut out = Record::default();
    for other in ctx.team_ids.iter().copied().filter(|id| *id != team) {
        let theirs = ctx.scores.score_or_average(ctx.week, other);
        if own > theirs {
            out.wins += 1;
        } else if own < theirs {
            out.losses += 1;
        }
    }
    out
}

/// Win above the week's median, loss below, tie on it. Only teams with a
/// recorded score take part.
pub fn median_week(ctx: &WeekContext<'_>, team: TeamId) -> Record {
    let (Some(own), Some(median)) = (ctx.scores.score(ctx.week, team), ctx.median) else {
        return Record::default();
    };
    let mut out = Record::default();
    if own > median {
        out.wins = 1;
    } else if own < median {
        out.losses = 1;
    } else {
        out.ties = 1;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub record: Record,
    pub win_pct: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub rank: u32,
}

pub fn compute_standings(kind: StandingKind, teams: &[Team], scores: &SeasonScores) -> Vec<StandingRow> {
    let mut teams = teams.iter().collect::<Vec<_>>();
    teams.sort_by_key(|t| t.id);
    let team_ids = teams.iter().map(|t| t.id).collect::<Vec<_>>();

    let mut records = teams
        .iter()
        .map(|t| (t.id, kind.seed(t)))
        .collect::<HashMap<_, _>>();

    if let Some(rule) = kind.weekly_rule() {
        for week in scores.weeks() {
            let ctx = WeekContext::new(scores, week, &team_ids);
            for id in &team_ids {
                let delta = rule(&ctx, *id);
                if let Some(r) = records.get_mut(id) {
                    *r += delta;
                }
            }
        }
    }

    let mut rows = teams
        .iter()
        .map(|t| {
            let record = records.get(&t.id).copied().unwrap_or_default();
            StandingRow {
                team_id: t.id,
                team_name: t.team_name.clone(),
                record,
                win_pct: record.win_pct(),
                points_for: t.points_for,
                points_against: t.points_against,
                rank: 0,
            }
        })
        .collect::<Vec<_>>();
    rank_by_win_pct(&mut rows);

    if kind == StandingKind::Actual {
        apply_final_standings(&mut rows, &teams);
    }
    rows
}

/// Teams with a final standing keep it. The rest take the unclaimed ranks
/// in their win%/points-for order, so ranks stay a permutation of 1..=N.
/// `rows` must already be in win%/points-for order.
fn apply_final_standings(rows: &mut [StandingRow], teams: &[&Team]) {
    let finals = teams
        .iter()
        .filter_map(|t| t.final_standing().map(|s| (t.id, s)))
        .collect::<HashMap<_, _>>();
    let claimed = finals.values().copied().collect::<HashSet<_>>();
    let mut next = 1u32;
    for row in rows.iter_mut() {
        if let Some(fin) = finals.get(&row.team_id) {
            row.rank = *fin;
            continue;
        }
        while claimed.contains(&next) {
            next += 1;
        }
        row.rank = next;
        next += 1;
    }
    rows.sort_by_key(|r| r.rank);
}

/// Sorts by win% desc then points-for desc and assigns 1-based ranks.
/// Remaining ties keep input order.
pub fn rank_by_win_pct(rows: &mut [StandingRow]) {
    rows.sort_by(|a, b| {
        stats::desc(a.win_pct, b.win_pct).then_with(|| stats::desc(a.points_for, b.points_for))
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx as u32 + 1;
    }
}

/// All four systems for one season, merged into stored rows (team id order).
pub fn compute_team_season_stats(year: i32, teams: &[Team], scores: &SeasonScores) -> Vec<TeamSeasonStats> {
    let by_kind = StandingKind::ALL
        .iter()
        .map(|kind| {
            let rows = compute_standings(*kind, teams, scores)
                .into_iter()
                .map(|r| (r.team_id, r))
                .collect::<HashMap<_, _>>();
            (*kind, rows)
        })
        .collect::<HashMap<_, _>>();

    let mut teams = teams.iter().collect::<Vec<_>>();
    teams.sort_by_key(|t| t.id);

    teams
        .into_iter()
        .filter_map(|t| {
            let actual = by_kind.get(&StandingKind::Actual)?.get(&t.id)?;
            let power = by_kind.get(&StandingKind::Power)?.get(&t.id)?;
            let median = by_kind.get(&StandingKind::Median)?.get(&t.id)?;
            let combined = by_kind.get(&StandingKind::Combined)?.get(&t.id)?;
            Some(TeamSeasonStats {
                season_year: year,
                team_id: t.id,
                points_for: t.points_for,
                points_against: t.points_against,
                actual: actual.record,
                power: power.record,
                median: median.record,
                combined: combined.record,
                actual_rank: actual.rank,
                power_rank: power.rank,
                median_rank: median.rank,
                combined_rank: combined.rank,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Contender,
    MidTier,
    GetOnTheStick,
    DumpsterFire,
}

impl Tier {
    pub fn from_combined_rank(rank: u32) -> Self {
        match rank {
            0..=4 => Tier::Contender,
            7..=9 => Tier::GetOnTheStick,
            r if r >= 10 => Tier::DumpsterFire,
            _ => Tier::MidTier,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Contender => "Contender",
            Tier::MidTier => "Mid-Tier",
            Tier::GetOnTheStick => "Get On The Stick",
            Tier::DumpsterFire => "Dumpster Fire",
        }
    }
}
