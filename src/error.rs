use thiserror::Error;

/// Failures surfaced to the user.
///
/// Load failures are fatal for the selected dataset; filter failures indicate
/// a defect (inputs are drawn from the data itself) and are reported, never
/// swallowed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplorerError {
    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),

    #[error("failed to load '{source_id}': {reason}")]
    DataSource { source_id: String, reason: String },

    #[error("invalid filter on column '{column}': {reason}")]
    FilterInput { column: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;

impl ExplorerError {
    pub(crate) fn filter(column: &str, reason: impl Into<String>) -> Self {
        ExplorerError::FilterInput {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
