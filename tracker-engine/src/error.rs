use std::fmt;

#[derive(Debug)]
pub enum Error {
    Load(String),
    Hydrate(String),
    WriteBack { id: String, reason: String },
    Cache(String),
    Storage(String),
    InvalidRecord(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Load(msg) => write!(f, "load error: {}", msg),
            Error::Hydrate(msg) => write!(f, "hydrate error: {}", msg),
            Error::WriteBack { id, reason } => write!(f, "write-back failed for {}: {}", id, reason),
            Error::Cache(msg) => write!(f, "durable cache error: {}", msg),
            Error::Storage(msg) => write!(f, "storage error: {}", msg),
            Error::InvalidRecord(msg) => write!(f, "invalid record: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
