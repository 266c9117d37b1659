use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unrecognized snapshot schema: {0}")]
    Deserialization(String),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
