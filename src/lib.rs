pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod export;
pub mod franchise;
pub mod history;
pub mod luck;
pub mod model;
pub mod notable;
pub mod playoffs;
pub mod query;
pub mod records;
pub mod report;
pub mod score_index;
pub mod season_score;
pub mod standings;
pub mod stats;
pub mod store;

pub use config::{AnalyticsConfig, AppConfig};
pub use error::{AnalyticsError, Result};
pub use model::{LeagueSnapshot, Matchup, Season, Team};
