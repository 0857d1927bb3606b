use std::path::PathBuf;

const APP_DIR: &str = "league_analytics";
const DB_FILE: &str = "league.sqlite";

/// Knobs for the pure computations. Passed explicitly, never global.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsConfig {
    /// Weeks after this never count toward stored standings.
    pub max_standings_week: u32,
    pub standings_include_playoffs: bool,
    pub playoff_cutoff_seeds: usize,
    /// Used when a season row carries no regular-season length.
    pub default_regular_weeks: u32,
    pub record_top_n: usize,
    pub notable_top_n: usize,
    pub record_book_top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_standings_week: 17,
            standings_include_playoffs: true,
            playoff_cutoff_seeds: 4,
            default_regular_weeks: 14,
            record_top_n: 5,
            notable_top_n: 10,
            record_book_top_n: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub log_filter: String,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Reads `.env.local`, `.env`, then the process environment. Unparseable
    /// values fall back to defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let defaults = AnalyticsConfig::default();
        let analytics = AnalyticsConfig {
            max_standings_week: env_parse("LEAGUE_MAX_STANDINGS_WEEK")
                .unwrap_or(defaults.max_standings_week)
                .max(1),
            standings_include_playoffs: env_bool("LEAGUE_STANDINGS_INCLUDE_PLAYOFFS")
                .unwrap_or(defaults.standings_include_playoffs),
            playoff_cutoff_seeds: env_parse("LEAGUE_PLAYOFF_CUTOFF_SEEDS")
                .unwrap_or(defaults.playoff_cutoff_seeds)
                .max(1),
            default_regular_weeks: env_parse("LEAGUE_DEFAULT_REGULAR_WEEKS")
                .unwrap_or(defaults.default_regular_weeks),
            record_top_n: env_parse("LEAGUE_RECORD_TOP_N").unwrap_or(defaults.record_top_n),
            notable_top_n: env_parse("LEAGUE_NOTABLE_TOP_N").unwrap_or(defaults.notable_top_n),
            record_book_top_n: env_parse("LEAGUE_RECORD_BOOK_TOP_N")
                .unwrap_or(defaults.record_book_top_n),
        };

        let db_path = std::env::var("LEAGUE_DB_PATH")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_db_path);

        let log_filter = std::env::var("RUST_LOG")
            .or_else(|_| std::env::var("LEAGUE_LOG"))
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        Self {
            db_path,
            log_filter,
            analytics,
        }
    }
}

pub fn app_data_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".local").join("share").join(APP_DIR))
}

pub fn default_db_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(DB_FILE))
}

/// Installs the fmt subscriber. Safe to call more than once.
pub fn init_tracing(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
