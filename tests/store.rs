use league_analytics::config::AnalyticsConfig;
use league_analytics::demo::{synthetic_league, team_ids};
use league_analytics::model::Season;
use league_analytics::{AnalyticsError, engine, query, store};
use tempfile::TempDir;

fn seeded_db(dir: &TempDir) -> rusqlite::Connection {
    let path = dir.path().join("league.sqlite");
    let mut conn = store::open_db(&path).expect("open db");
    let league = synthetic_league(3, 10, 13, 17);
    let summary = store::import_snapshot(&mut conn, &league).expect("import");
    assert_eq!(summary.seasons, 3);
    assert_eq!(summary.teams, 30);
    conn
}

#[test]
fn import_is_idempotent_and_round_trips() {
    let dir = TempDir::new().expect("tempdir");
    let mut conn = seeded_db(&dir);
    let league = synthetic_league(3, 10, 13, 17);
    store::import_snapshot(&mut conn, &league).expect("second import");

    let loaded = store::load_snapshot(&conn).expect("load");
    assert_eq!(loaded.seasons.len(), 3);
    assert_eq!(loaded.teams.len(), league.teams.len());
    assert_eq!(loaded.matchups.len(), league.matchups.len());
    let mut ids = loaded
        .teams
        .iter()
        .filter(|t| t.season_year == 2016)
        .map(|t| t.id)
        .collect::<Vec<_>>();
    ids.sort_unstable();
    assert_eq!(ids, team_ids(&league, 2016));
}

#[test]
fn recompute_twice_gives_identical_rows() {
    let dir = TempDir::new().expect("tempdir");
    let mut conn = seeded_db(&dir);
    let cfg = AnalyticsConfig::default();

    let first_summary = engine::recompute_season(&mut conn, 2016, &cfg).expect("recompute");
    let first = store::load_team_season_stats(&conn, Some(2016)).expect("stats");
    let first_records = store::load_league_records(&conn, 2016).expect("records");

    let second_summary = engine::recompute_season(&mut conn, 2016, &cfg).expect("recompute");
    let second = store::load_team_season_stats(&conn, Some(2016)).expect("stats");
    let second_records = store::load_league_records(&conn, 2016).expect("records");

    assert_eq!(first_summary, second_summary);
    assert_eq!(first, second);
    assert_eq!(first_records, second_records);
    assert_eq!(first.len(), 10);
    assert_eq!(first_records.len(), 12);

    let mut ranks = first.iter().map(|s| s.combined_rank).collect::<Vec<_>>();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=10).collect::<Vec<_>>());

    let runs = store::load_runs(&conn).expect("runs");
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|r| r.finished_at.is_some() && r.teams_written == 10));
}

#[test]
fn failed_replace_closes_the_run_with_its_error() {
    let dir = TempDir::new().expect("tempdir");
    let mut conn = seeded_db(&dir);
    conn.execute_batch("DROP TABLE team_season_stats").expect("drop table");

    let err = engine::recompute_season(&mut conn, 2016, &AnalyticsConfig::default())
        .expect_err("replace should fail");
    assert!(matches!(err, AnalyticsError::Storage(_)));

    let runs = store::load_runs(&conn).expect("runs");
    assert_eq!(runs.len(), 1);
    assert!(runs[0].finished_at.is_some());
    assert_eq!(runs[0].teams_written, 0);
    let message = runs[0].error.as_deref().expect("failure recorded");
    assert!(message.contains("team_season_stats"));
}

#[test]
fn recompute_all_skips_seasons_without_teams() {
    let dir = TempDir::new().expect("tempdir");
    let mut conn = seeded_db(&dir);
    let empty = league_analytics::LeagueSnapshot {
        seasons: vec![Season {
            year: 2030,
            league_name: "Future".to_string(),
            regular_season_weeks: 14,
            is_legacy: false,
        }],
        ..Default::default()
    };
    store::import_snapshot(&mut conn, &empty).expect("import empty season");

    let summaries = engine::recompute_all(&mut conn, &AnalyticsConfig::default()).expect("recompute all");
    let years = summaries.iter().map(|s| s.year).collect::<Vec<_>>();
    assert_eq!(years, vec![2015, 2016, 2017]);
    assert!(summaries.iter().all(|s| s.teams_written == 10));
}

#[test]
fn missing_season_is_reported_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let mut conn = seeded_db(&dir);
    let err = engine::recompute_season(&mut conn, 1999, &AnalyticsConfig::default())
        .expect_err("no such season");
    assert!(matches!(err, AnalyticsError::SeasonNotFound(1999)));
    assert!(matches!(
        query::standings(&conn, 1999),
        Err(AnalyticsError::SeasonNotFound(1999))
    ));
}

#[test]
fn standings_query_joins_names_and_tiers() {
    let dir = TempDir::new().expect("tempdir");
    let mut conn = seeded_db(&dir);
    assert!(query::standings(&conn, 2017).expect("before recompute").is_empty());

    engine::recompute_season(&mut conn, 2017, &AnalyticsConfig::default()).expect("recompute");
    let rows = query::standings(&conn, 2017).expect("standings");
    assert_eq!(rows.len(), 10);
    assert!(rows.iter().all(|r| !r.team_name.is_empty() && !r.owner_name.is_empty()));
    assert!(rows.windows(2).all(|w| w[0].actual_rank < w[1].actual_rank));
    for r in &rows {
        assert_eq!(r.combined.wins, r.actual.wins + r.median.wins);
    }

    let records = query::season_records(&conn, 2017).expect("records");
    assert!(records.iter().all(|r| !r.label.is_empty()));
    assert!(records.iter().any(|r| r.label.contains(" vs ")));
}
