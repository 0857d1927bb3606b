use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use league_analytics::config::{self, AppConfig};
use league_analytics::{LeagueSnapshot, engine, store};

fn main() -> Result<()> {
    let cfg = AppConfig::from_env();
    config::init_tracing(&cfg.log_filter);

    let snapshot_path = parse_snapshot_arg()
        .ok_or_else(|| anyhow!("usage: import_snapshot <snapshot.json> [--db PATH] [--recompute]"))?;
    let db_path = parse_db_path_arg()
        .or_else(|| cfg.db_path.clone())
        .context("unable to resolve sqlite path")?;

    let raw = std::fs::read_to_string(&snapshot_path)
        .with_context(|| format!("read snapshot {}", snapshot_path.display()))?;
    let snapshot = LeagueSnapshot::from_json(&raw)
        .with_context(|| format!("parse snapshot {}", snapshot_path.display()))?;

    let mut conn = store::open_db(&db_path)
        .with_context(|| format!("open sqlite db {}", db_path.display()))?;
    let summary = store::import_snapshot(&mut conn, &snapshot).context("import snapshot")?;

    println!("Snapshot import complete");
    println!("DB: {}", db_path.display());
    println!(
        "Seasons: {} Teams: {} Matchups: {}",
        summary.seasons, summary.teams, summary.matchups
    );

    if std::env::args().any(|arg| arg == "--recompute") {
        for s in engine::recompute_all(&mut conn, &cfg.analytics)? {
            println!(
                "season {}: teams={} weeks={} records={}",
                s.year, s.teams_written, s.weeks, s.records_written
            );
        }
    }
    Ok(())
}

/// First argument that is neither a flag nor the value of `--db`.
fn parse_snapshot_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut skip_next = false;
    for arg in &args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--db" {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") && !arg.trim().is_empty() {
            return Some(PathBuf::from(arg));
        }
    }
    None
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
