use std::collections::HashMap;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use league_analytics::config::AnalyticsConfig;
use league_analytics::demo::synthetic_league;
use league_analytics::engine::compute_season_analytics;
use league_analytics::franchise::franchise_ratings;
use league_analytics::notable::notable_games;
use league_analytics::records::record_book;
use league_analytics::{LeagueSnapshot, store};

fn bench_season_analytics(c: &mut Criterion) {
    let league = synthetic_league(1, 12, 14, 1);
    let season = league.season(2015).expect("synthetic season");
    let cfg = AnalyticsConfig::default();
    c.bench_function("season_analytics", |b| {
        b.iter(|| {
            let analytics = compute_season_analytics(black_box(&season), &cfg);
            black_box(analytics.stats.len());
        })
    });
}

fn bench_notable_games(c: &mut Criterion) {
    let league = synthetic_league(10, 12, 14, 2);
    let cfg = AnalyticsConfig::default();
    let mut ranks = HashMap::new();
    for year in league.season_years() {
        if let Ok(season) = league.season(year) {
            for s in compute_season_analytics(&season, &cfg).stats {
                ranks.insert(s.team_id, s.combined_rank);
            }
        }
    }
    c.bench_function("notable_games", |b| {
        b.iter(|| {
            let games = notable_games(black_box(&league), &ranks, &cfg);
            black_box(games.best_games.len());
        })
    });
}

fn bench_franchise_ratings(c: &mut Criterion) {
    let league = synthetic_league(10, 12, 14, 3);
    c.bench_function("franchise_ratings", |b| {
        b.iter(|| {
            let ratings = franchise_ratings(black_box(&league));
            black_box(ratings.len());
        })
    });
}

fn bench_record_book(c: &mut Criterion) {
    let league = synthetic_league(10, 12, 14, 4);
    c.bench_function("record_book", |b| {
        b.iter(|| {
            let book = record_book(black_box(&league), 10);
            black_box(book.shootouts.len());
        })
    });
}

fn bench_snapshot_roundtrip(c: &mut Criterion) {
    let league = synthetic_league(3, 10, 14, 5);
    c.bench_function("snapshot_import_load", |b| {
        b.iter(|| {
            let mut conn = store::open_in_memory().expect("in-memory db");
            store::import_snapshot(&mut conn, black_box(&league)).expect("import");
            let loaded: LeagueSnapshot = store::load_snapshot(&conn).expect("load");
            black_box(loaded.matchups.len());
        })
    });
}

criterion_group!(
    perf,
    bench_season_analytics,
    bench_notable_games,
    bench_franchise_ratings,
    bench_record_book,
    bench_snapshot_roundtrip
);
criterion_main!(perf);
