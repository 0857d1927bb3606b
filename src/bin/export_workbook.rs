use std::path::PathBuf;

use anyhow::{Context, Result};

use league_analytics::config::{self, AppConfig};
use league_analytics::{export, store};

const DEFAULT_OUT: &str = "league_analytics.xlsx";

fn main() -> Result<()> {
    let cfg = AppConfig::from_env();
    config::init_tracing(&cfg.log_filter);

    let db_path = parse_path_arg("--db")
        .or_else(|| cfg.db_path.clone())
        .context("unable to resolve sqlite path")?;
    let out_path = parse_path_arg("--out").unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));

    let conn = store::open_db(&db_path)
        .with_context(|| format!("open sqlite db {}", db_path.display()))?;
    let snapshot = store::load_snapshot(&conn).context("load league snapshot")?;
    let report = export::export_workbook(&out_path, &snapshot, &cfg.analytics)
        .with_context(|| format!("export workbook {}", out_path.display()))?;

    println!("Workbook written to {}", out_path.display());
    println!("Seasons: {}", report.seasons);
    println!("Standings rows: {}", report.standings);
    println!("Luck rows: {}", report.luck);
    println!("Season score rows: {}", report.season_scores);
    println!("Franchises: {}", report.franchises);
    println!("Notable games: {}", report.notable_games);
    println!("Record book rows: {}", report.record_book);
    Ok(())
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
