use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read snapshot {}: {source}", path.display())]
    ReadSnapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON: {0}")]
    ParseSnapshot(#[from] serde_json::Error),

    #[error("invalid layout settings: {0}")]
    Settings(#[from] Box<figment::Error>),
}

pub type Result<T> = std::result::Result<T, Error>;
