use std::collections::HashMap;

use league_analytics::config::AnalyticsConfig;
use league_analytics::demo::synthetic_league;
use league_analytics::notable::{self, NotableGame};
use league_analytics::{engine, query, store};

fn assert_ranked(list: &[NotableGame], top_n: usize) {
    assert!(!list.is_empty());
    assert!(list.len() <= top_n);
    assert!(list.windows(2).all(|w| w[0].score_value >= w[1].score_value));
    assert!(list.iter().all(|g| (0.0..=100.0).contains(&g.score_value)));
    assert!(list.iter().all(|g| g.winner != g.loser));
}

#[test]
fn notable_lists_from_stored_ranks() {
    let mut conn = store::open_in_memory().expect("db");
    let league = synthetic_league(4, 10, 13, 99);
    store::import_snapshot(&mut conn, &league).expect("import");
    let cfg = AnalyticsConfig::default();
    engine::recompute_all(&mut conn, &cfg).expect("recompute");

    let games = query::notable_games(&conn, &cfg).expect("notable");
    for list in [
        &games.best_games,
        &games.worst_games,
        &games.brutal_losses,
        &games.pathetic_wins,
    ] {
        assert_ranked(list, cfg.notable_top_n);
        assert_eq!(list.len(), cfg.notable_top_n);
    }
}

#[test]
fn factors_stay_in_unit_range() {
    let league = synthetic_league(2, 9, 12, 5);
    let scored = notable::score_games(&league, &HashMap::new(), &AnalyticsConfig::default());
    // Odd team count: one bye per week never becomes a game.
    let contested = league.matchups.iter().filter(|m| m.is_contested()).count();
    assert_eq!(scored.len(), contested);
    for g in &scored {
        let f = g.factors;
        for v in [
            f.combined_pct,
            f.closeness_pct,
            f.margin_pct,
            f.winner_all_play,
            f.loser_all_play,
            f.winner_score_pct,
            f.loser_score_pct,
            f.importance,
            f.winner_strength,
            f.loser_strength,
            f.upset,
        ] {
            assert!((0.0..=1.0).contains(&v), "{v} out of range in {:?}", g.matchup);
        }
        // Without stored ranks every team reads as average strength.
        assert_eq!(f.winner_strength, 0.5);
        assert_eq!(f.upset, 0.0);
        assert!(g.factors.winner_all_play >= g.factors.loser_all_play);
    }
}

#[test]
fn ties_keep_newest_season_first() {
    let league = synthetic_league(2, 6, 8, 12);
    let cfg = AnalyticsConfig {
        notable_top_n: 1_000,
        ..AnalyticsConfig::default()
    };
    let games = notable::notable_games(&league, &HashMap::new(), &cfg);
    for pair in games.best_games.windows(2) {
        if pair[0].score_value == pair[1].score_value {
            let key = |g: &NotableGame| (std::cmp::Reverse(g.year), g.week, g.matchup_id);
            assert!(key(&pair[0]) <= key(&pair[1]));
        }
    }
}
