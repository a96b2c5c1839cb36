use thiserror::Error;

/// Errors raised while driving a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A data operation was issued before `connect` (or after `disconnect`).
    #[error("{0} is not connected")]
    NotConnected(&'static str),

    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("postgres error: {0}")]
    Orm(#[from] sea_orm::DbErr),

    #[error("dianadb error: {0}")]
    Diana(#[from] crate::diana::Error),

    #[error("invalid birthday: {0}")]
    Birthday(#[from] chrono::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to create directory: {0}")]
    Dir(#[from] fs_extra::error::Error),
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;
