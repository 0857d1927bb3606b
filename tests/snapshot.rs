use league_analytics::config::AnalyticsConfig;
use league_analytics::export::export_workbook;
use league_analytics::report::season_report;
use league_analytics::score_index::{IndexFilter, ScoreIndex};
use league_analytics::season_score::season_scores;
use league_analytics::{LeagueSnapshot, engine, query, store};
use tempfile::TempDir;

fn fixture() -> LeagueSnapshot {
    LeagueSnapshot::from_json(SNAPSHOT_JSON).expect("valid fixture json")
}

#[test]
fn optional_fields_default() {
    let snap = fixture();
    assert_eq!(snap.seasons[0].league_name, "Fixture League");
    assert!(!snap.seasons[0].is_legacy);
    let delta = snap.team(4).expect("delta");
    assert_eq!(delta.ties, 0);
    assert_eq!(delta.final_standing, None);
    assert_eq!(delta.franchise_id, None);
    let first = &snap.matchups[0];
    assert!(!first.is_playoff && !first.is_bye);
    assert!(snap.matchups[7].is_placeholder());
}

#[test]
fn malformed_snapshot_is_an_error() {
    let err = LeagueSnapshot::from_json("{\"seasons\": [{\"year\": \"soon\"}]}").expect_err("bad json");
    assert!(matches!(err, league_analytics::AnalyticsError::Snapshot(_)));
}

#[test]
fn report_has_luck_and_bracket() {
    let report = season_report(&fixture(), 2022, &AnalyticsConfig::default()).expect("report");
    assert_eq!(report.teams, vec!["Alpha", "Bravo", "Charlie", "Delta"]);

    let luck = report
        .luck_index
        .iter()
        .map(|e| (e.team_id, e.luck_index))
        .collect::<Vec<_>>();
    // Charlie won a game its scores only earned a third of.
    assert_eq!(luck[0].0, 3);
    assert!((luck[0].1 - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!((luck[1].0, luck[2].0, luck[3].0), (1, 4, 2));
    assert!((luck[3].1 + 1.0 / 3.0).abs() < 1e-9);

    let rounds = &report.playoff_bracket.rounds;
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0].name, "Semi-Finals");
    assert_eq!(rounds[1].name, "Championship");
    assert_eq!(rounds[0].games[0].winner, "(1) Alpha");
    assert_eq!(rounds[0].games[0].away_team, "(-) Delta");
    assert_eq!(rounds[0].games[1].winner, "(3) Charlie");
    assert_eq!(rounds[1].games[0].winner, "(1) Alpha");
    assert_eq!(rounds[1].games[1].winner, "TBD");
}

#[test]
fn season_scores_follow_weights() {
    let snap = fixture();
    let index = ScoreIndex::build(&snap.matchups, IndexFilter::regular_season());
    let scores = season_scores(&snap.teams, &index.season_or_empty(2022));
    let by_id = |id: i64| scores.iter().find(|s| s.team_id == id).expect("score");
    assert_eq!(by_id(1).season_score, 100.0);
    // 0.20 * 0.25 + 0.35 * 0.25 + 0.35 * 0 + 0.10 * 0.3
    assert_eq!(by_id(4).season_score, 16.75);
}

#[test]
fn stored_report_matches_live_report() {
    let mut conn = store::open_in_memory().expect("db");
    let snap = fixture();
    store::import_snapshot(&mut conn, &snap).expect("import");
    let cfg = AnalyticsConfig::default();
    let summary = engine::recompute_season(&mut conn, 2022, &cfg).expect("recompute");
    assert_eq!(summary.weeks, 4);

    let live = season_report(&snap, 2022, &cfg).expect("live");
    let stored = query::season_report(&conn, 2022, &cfg).expect("stored");
    assert_eq!(live, stored);

    let standings = query::standings(&conn, 2022).expect("standings");
    let actual = standings.iter().map(|s| s.team_id).collect::<Vec<_>>();
    assert_eq!(actual, vec![1, 2, 3, 4]);
}

#[test]
fn workbook_export_counts_rows() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("league.xlsx");
    let report = export_workbook(&out, &fixture(), &AnalyticsConfig::default()).expect("export");
    assert!(out.exists());
    assert_eq!(report.seasons, 1);
    assert_eq!(report.standings, 4);
    assert_eq!(report.luck, 4);
    assert_eq!(report.season_scores, 4);
    assert_eq!(report.franchises, 4);
    assert_eq!(report.notable_games, 4 * 7);
    assert_eq!(report.record_book, 4 * 7 + 2 * 10);
}

static SNAPSHOT_JSON: &str = include_str!("fixtures/league_snapshot.json");
