use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid asset type: {0}")]
    InvalidType(String),

    #[error("No collection is currently attached to this collector")]
    NoCollectionAttached,

    #[error("Collector is locked: {0}")]
    Locked(String),

    #[error("Collector is already locked")]
    AlreadyLocked,

    #[error("Collector is not locked")]
    NotLocked,

    #[error("Attempted to unlock collector with incorrect key")]
    WrongKey,

    #[error("Library is frozen: {0}")]
    Frozen(String),

    #[error("Filter '{name}' failed: {message}")]
    Filter { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
