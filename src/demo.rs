//! Deterministic synthetic leagues for the demo command, tests and benches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{LeagueSnapshot, Matchup, Season, Team, TeamId};

const FIRST_YEAR: i32 = 2015;
const OWNERS: [&str; 14] = [
    "Alex Moore", "Blake Chen", "Casey Diaz", "Drew Patel", "Emery Okafor", "Finley Ross",
    "Gray Novak", "Harper Lee", "Indy Walsh", "Jordan Kim", "Kai Brennan", "Logan Price",
    "Morgan Shaw", "Noel Ortiz",
];
const MASCOTS: [&str; 8] = [
    "Gridiron Gurus", "Waiver Wolves", "Bench Mob", "Sunday Scaries", "End Zone Elite",
    "Fourth & Long", "Blitz Brigade", "Hail Marys",
];

/// Builds `seasons` consecutive seasons of `teams` teams with a round-robin
/// regular season of `weeks` weeks and a four-team, two-round playoff.
/// Franchises keep a stable id across seasons; team names drift.
pub fn synthetic_league(seasons: usize, teams: usize, weeks: u32, seed: u64) -> LeagueSnapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let teams = teams.max(2);
    let mut snapshot = LeagueSnapshot::default();
    let mut next_matchup = 1i64;

    for s in 0..seasons {
        let year = FIRST_YEAR + s as i32;
        snapshot.seasons.push(Season {
            year,
            league_name: "Synthetic League".to_string(),
            regular_season_weeks: weeks,
            is_legacy: s == 0,
        });

        let mut season_teams = (0..teams)
            .map(|idx| {
                let owner = OWNERS[idx % OWNERS.len()];
                let mascot = MASCOTS[(idx + s / 3) % MASCOTS.len()];
                Team {
                    id: year as i64 * 100 + idx as i64 + 1,
                    season_year: year,
                    franchise_id: Some(format!("F{:02}", idx + 1)),
                    owner_name: owner.to_string(),
                    team_name: format!("{} {mascot}", owner.split(' ').next().unwrap_or(owner)),
                    wins: 0,
                    losses: 0,
                    ties: 0,
                    points_for: 0.0,
                    points_against: 0.0,
                    final_standing: None,
                }
            })
            .collect::<Vec<_>>();
        let strength = (0..teams)
            .map(|_| rng.gen_range(-12.0..12.0))
            .collect::<Vec<f64>>();

        for week in 1..=weeks {
            for (a, b) in round_robin_pairs(teams, week) {
                let Some(b) = b else {
                    let team = &season_teams[a];
                    snapshot.matchups.push(Matchup {
                        id: next_matchup,
                        season_year: year,
                        week,
                        home_team_id: team.id,
                        away_team_id: None,
                        home_score: 0.0,
                        away_score: 0.0,
                        is_playoff: false,
                        is_bye: true,
                    });
                    next_matchup += 1;
                    continue;
                };
                let hs = weekly_score(&mut rng, strength[a]);
                let aws = weekly_score(&mut rng, strength[b]);
                apply_result(&mut season_teams, a, b, hs, aws);
                snapshot.matchups.push(Matchup {
                    id: next_matchup,
                    season_year: year,
                    week,
                    home_team_id: season_teams[a].id,
                    away_team_id: Some(season_teams[b].id),
                    home_score: hs,
                    away_score: aws,
                    is_playoff: false,
                    is_bye: false,
                });
                next_matchup += 1;
            }
        }

        // Seeds by record then points.
        let mut seeds = (0..teams).collect::<Vec<_>>();
        seeds.sort_by(|x, y| {
            let (tx, ty) = (&season_teams[*x], &season_teams[*y]);
            ty.wins
                .cmp(&tx.wins)
                .then_with(|| ty.points_for.total_cmp(&tx.points_for))
        });

        let mut finish = seeds.clone();
        if teams >= 4 {
            let mut play = |home: usize, away: usize, week: u32, rng: &mut StdRng| {
                let hs = weekly_score(rng, strength[home]);
                let aws = weekly_score(rng, strength[away]);
                snapshot.matchups.push(Matchup {
                    id: next_matchup,
                    season_year: year,
                    week,
                    home_team_id: season_teams[home].id,
                    away_team_id: Some(season_teams[away].id),
                    home_score: hs,
                    away_score: aws,
                    is_playoff: true,
                    is_bye: false,
                });
                next_matchup += 1;
                if hs >= aws { (home, away) } else { (away, home) }
            };
            let (w1, l1) = play(seeds[0], seeds[3], weeks + 1, &mut rng);
            let (w2, l2) = play(seeds[1], seeds[2], weeks + 1, &mut rng);
            let (champ, runner_up) = play(w1, w2, weeks + 2, &mut rng);
            let (third, fourth) = play(l1, l2, weeks + 2, &mut rng);
            finish = vec![champ, runner_up, third, fourth];
            finish.extend(seeds.iter().copied().skip(4));
        }
        for (place, idx) in finish.into_iter().enumerate() {
            season_teams[idx].final_standing = Some(place as u32 + 1);
        }
        snapshot.teams.extend(season_teams);
    }
    snapshot
}

fn weekly_score(rng: &mut StdRng, strength: f64) -> f64 {
    let raw: f64 = 105.0 + strength + rng.gen_range(-30.0..30.0);
    (raw.max(40.0) * 100.0).round() / 100.0
}

fn apply_result(teams: &mut [Team], a: usize, b: usize, hs: f64, aws: f64) {
    teams[a].points_for += hs;
    teams[a].points_against += aws;
    teams[b].points_for += aws;
    teams[b].points_against += hs;
    if hs > aws {
        teams[a].wins += 1;
        teams[b].losses += 1;
    } else if hs < aws {
        teams[b].wins += 1;
        teams[a].losses += 1;
    } else {
        teams[a].ties += 1;
        teams[b].ties += 1;
    }
}

/// Circle-method pairings for one week. With an odd count the slot paired
/// with the phantom team gets a bye (`None`).
fn round_robin_pairs(n: usize, week: u32) -> Vec<(usize, Option<usize>)> {
    let slots = if n % 2 == 0 { n } else { n + 1 };
    let rounds = slots - 1;
    let round = (week as usize - 1) % rounds;
    let mut order = Vec::with_capacity(slots);
    order.push(0);
    for i in 0..rounds {
        order.push(1 + (i + round) % rounds);
    }
    let mut out = Vec::with_capacity(slots / 2);
    for i in 0..slots / 2 {
        let (x, y) = (order[i], order[slots - 1 - i]);
        match (x < n, y < n) {
            (true, true) => out.push((x, Some(y))),
            (true, false) => out.push((x, None)),
            (false, true) => out.push((y, None)),
            (false, false) => {}
        }
    }
    out
}

/// Team ids of one synthetic season, ascending.
pub fn team_ids(snapshot: &LeagueSnapshot, year: i32) -> Vec<TeamId> {
    let mut ids = snapshot
        .teams
        .iter()
        .filter(|t| t.season_year == year)
        .map(|t| t.id)
        .collect::<Vec<_>>();
    ids.sort_unstable();
    ids
}
