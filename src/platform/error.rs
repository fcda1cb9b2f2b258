//! Harness error type.

use thiserror::Error;

pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("scenario not found: {0:?}")]
    ScenarioNotFound(String),

    #[error("no active scenario (select one from the catalog first)")]
    NoActiveScenario,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
