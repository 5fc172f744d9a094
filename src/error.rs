use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid question source {path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not allowed right now: {0}")]
    State(String),

    #[error("Could not write question storage: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Could not encode question storage: {0}")]
    Encoding(#[from] csv::Error),
}

impl Error {
    pub(crate) fn schema<P: Into<PathBuf>, S: ToString>(path: P, reason: S) -> Self {
        Error::Schema {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
