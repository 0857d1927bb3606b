use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::info;

use league_analytics::config::{self, AppConfig};
use league_analytics::{demo, engine, query, store};

const USAGE: &str = "usage: league_analytics [--db PATH] <command>

commands:
  recompute [--season YEAR]   rebuild stored standings and records
  standings YEAR              stored standings with tiers
  records YEAR                stored season records
  season YEAR                 live season report
  history                     all-time franchise ratings
  notable                     notable games across every season
  record-book                 all-time record book
  team KEY                    one franchise's history
  demo [--seed N]             load a synthetic league and recompute it";

fn main() -> Result<()> {
    let cfg = AppConfig::from_env();
    config::init_tracing(&cfg.log_filter);

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let positional = positional_args(&args);
    let Some(command) = positional.first().map(String::as_str) else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    let db_path = flag_value(&args, "--db")
        .map(PathBuf::from)
        .or_else(|| cfg.db_path.clone())
        .context("unable to resolve sqlite path; set LEAGUE_DB_PATH or pass --db")?;
    let mut conn = store::open_db(&db_path)
        .with_context(|| format!("open sqlite db {}", db_path.display()))?;
    let analytics = cfg.analytics;

    match command {
        "recompute" => {
            let summaries = match flag_value(&args, "--season") {
                Some(raw) => vec![engine::recompute_season(&mut conn, parse_year(&raw)?, &analytics)?],
                None => engine::recompute_all(&mut conn, &analytics)?,
            };
            for s in &summaries {
                println!(
                    "season {}: teams={} weeks={} records={}",
                    s.year, s.teams_written, s.weeks, s.records_written
                );
            }
        }
        "standings" => print_json(&query::standings(&conn, year_arg(&positional)?)?)?,
        "records" => print_json(&query::season_records(&conn, year_arg(&positional)?)?)?,
        "season" => print_json(&query::season_report(&conn, year_arg(&positional)?, &analytics)?)?,
        "history" => print_json(&query::league_history(&conn)?)?,
        "notable" => print_json(&query::notable_games(&conn, &analytics)?)?,
        "record-book" => print_json(&query::record_book(&conn, &analytics)?)?,
        "team" => {
            let key = positional
                .get(1)
                .ok_or_else(|| anyhow!("team needs a franchise key"))?;
            print_json(&query::team_history(&conn, key)?)?;
        }
        "demo" => {
            let seed = flag_value(&args, "--seed")
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .unwrap_or(2024);
            let league = demo::synthetic_league(6, 10, 14, seed);
            let imported = store::import_snapshot(&mut conn, &league)?;
            info!(
                seasons = imported.seasons,
                teams = imported.teams,
                matchups = imported.matchups,
                "imported synthetic league"
            );
            let summaries = engine::recompute_all(&mut conn, &analytics)?;
            println!("Demo league loaded into {}", db_path.display());
            println!(
                "Seasons: {} Teams: {} Matchups: {}",
                imported.seasons, imported.teams, imported.matchups
            );
            println!("Seasons recomputed: {}", summaries.len());
        }
        other => {
            eprintln!("{USAGE}");
            return Err(anyhow!("unknown command: {other}"));
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{raw}");
    Ok(())
}

fn year_arg(positional: &[String]) -> Result<i32> {
    let raw = positional
        .get(1)
        .ok_or_else(|| anyhow!("missing season year"))?;
    parse_year(raw)
}

fn parse_year(raw: &str) -> Result<i32> {
    raw.trim()
        .parse::<i32>()
        .with_context(|| format!("invalid season year: {raw}"))
}

/// Accepts `--name value` and `--name=value`.
fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

const VALUE_FLAGS: [&str; 3] = ["--db", "--season", "--seed"];

fn positional_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        out.push(arg.clone());
    }
    out
}
