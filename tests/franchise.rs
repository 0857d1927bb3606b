use league_analytics::franchise::{FranchiseKey, franchise_ratings};
use league_analytics::history::{Trophy, team_history};
use league_analytics::model::{LeagueSnapshot, Matchup, Season, Team};
use league_analytics::AnalyticsError;

fn season(year: i32) -> Season {
    Season {
        year,
        league_name: "Franchise League".to_string(),
        regular_season_weeks: 13,
        is_legacy: false,
    }
}

#[allow(clippy::too_many_arguments)]
fn team(
    id: i64,
    year: i32,
    owner: &str,
    name: &str,
    wins: u32,
    losses: u32,
    points_for: f64,
    finish: u32,
) -> Team {
    Team {
        id,
        season_year: year,
        franchise_id: None,
        owner_name: owner.to_string(),
        team_name: name.to_string(),
        wins,
        losses,
        ties: 0,
        points_for,
        points_against: 0.0,
        final_standing: Some(finish),
    }
}

fn game(id: i64, year: i32, home: i64, away: i64, hs: f64, aws: f64) -> Matchup {
    Matchup {
        id,
        season_year: year,
        week: 1,
        home_team_id: home,
        away_team_id: Some(away),
        home_score: hs,
        away_score: aws,
        is_playoff: false,
        is_bye: false,
    }
}

/// One owner across three seasons under three team names, each season
/// against a single rival.
fn renamed_owner_league() -> LeagueSnapshot {
    LeagueSnapshot {
        seasons: vec![season(2019), season(2020), season(2021)],
        teams: vec![
            team(1, 2019, "Pat Smith", "Smith Happens", 8, 5, 1300.0, 1),
            team(2, 2019, "Rival Owner", "Rivals", 5, 8, 1200.0, 2),
            team(3, 2020, "pat  smith", "Pat's Patriots", 10, 3, 1400.0, 2),
            team(4, 2020, "Rival Owner", "Rivals", 3, 10, 1100.0, 1),
            team(5, 2021, " Pat Smith", "Return of Pat", 5, 8, 1250.0, 3),
            team(6, 2021, "Rival Owner", "Rivals", 8, 5, 1150.0, 4),
        ],
        matchups: vec![
            game(1, 2019, 1, 2, 120.0, 100.0),
            game(2, 2020, 3, 4, 130.0, 90.0),
            game(3, 2021, 6, 5, 95.0, 110.0),
        ],
    }
}

#[test]
fn renamed_owner_aggregates_into_one_franchise() {
    let ratings = franchise_ratings(&renamed_owner_league());
    assert_eq!(ratings.len(), 2);
    let pat = ratings
        .iter()
        .find(|r| r.key == FranchiseKey::from_owner("Pat Smith"))
        .expect("pat's franchise");

    assert_eq!(pat.seasons_played, 3);
    assert_eq!(pat.team_name, "Return of Pat");
    assert_eq!(pat.record.display(), "23-16");
    // 23 wins over 13 + 13 + 13 games.
    assert!((pat.inputs.win_pct - 23.0 / 39.0).abs() < 1e-12);
    assert_eq!(pat.inputs.all_play_pct, 1.0);
    assert_eq!(pat.inputs.pf_percentile, 1.0);
    assert_eq!(
        (pat.inputs.championships, pat.inputs.runner_ups, pat.inputs.thirds),
        (1, 1, 1)
    );

    let expected = (450.0 * 23.0 / 39.0 + 300.0 + 250.0 + 100.0 + 50.0 + 25.0_f64).round() as i64;
    assert_eq!(pat.league_rating, expected);
    assert_eq!(pat.league_rating, 990);
    assert_eq!(ratings[0].key, pat.key);
}

#[test]
fn rival_rating_uses_losing_all_play_and_lower_pf() {
    let ratings = franchise_ratings(&renamed_owner_league());
    let rival = ratings
        .iter()
        .find(|r| r.owner_name == "Rival Owner")
        .expect("rival");
    assert_eq!(rival.inputs.all_play_pct, 0.0);
    assert_eq!(rival.inputs.pf_percentile, 0.5);
    // 16/39 win pct, one title, one runner-up.
    let expected = (450.0 * 16.0 / 39.0 + 125.0 + 150.0_f64).round() as i64;
    assert_eq!(rival.league_rating, expected);
}

#[test]
fn team_history_lists_newest_season_first() {
    let league = renamed_owner_league();
    let history = team_history(&league, "PAT SMITH").expect("history");
    let years = history.seasons.iter().map(|s| s.year).collect::<Vec<_>>();
    assert_eq!(years, vec![2021, 2020, 2019]);
    assert_eq!(history.summary.record, "23-16-0");
    assert_eq!(history.summary.championships, 1);
    assert_eq!(history.summary.playoff_appearances, 3);
    assert_eq!(history.seasons[2].trophy, Some(Trophy::Champion));
    assert_eq!(history.seasons[0].all_play_record, "1-0");
    assert!((history.seasons[2].points_for_avg - 100.0).abs() < 1e-9);
}

#[test]
fn unknown_franchise_is_not_found() {
    let err = team_history(&renamed_owner_league(), "nobody").expect_err("missing");
    assert!(matches!(err, AnalyticsError::FranchiseNotFound(_)));
    assert!(err.is_not_found());
    assert!(matches!(
        team_history(&renamed_owner_league(), "  "),
        Err(AnalyticsError::InvalidFranchiseKey(_))
    ));
}
