use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("season {0} not found")]
    SeasonNotFound(i32),

    #[error("no teams found for season {0}")]
    NoTeams(i32),

    #[error("franchise not found: {0}")]
    FranchiseNotFound(String),

    #[error("invalid franchise key: {0:?}")]
    InvalidFranchiseKey(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("snapshot json error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("workbook export failed: {0}")]
    Export(String),
}

impl AnalyticsError {
    /// The read side maps these to a "not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AnalyticsError::SeasonNotFound(_)
                | AnalyticsError::NoTeams(_)
                | AnalyticsError::FranchiseNotFound(_)
        )
    }
}
