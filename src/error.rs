use std::path::PathBuf;

use thiserror::Error;

use crate::command::ParseError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid UTF-8 text")]
    Decode { path: PathBuf },

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("can't open sqlite database '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema version mismatch: expected {expected}, found '{found}'")]
    SchemaVersionMismatch { expected: u32, found: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Command(#[from] ParseError),

    #[error("can't write output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
