use std::{io, path::PathBuf};
use thiserror::Error;

use crate::duration::ParseError;
use crate::store::TimerError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid duration: {0}")]
    Duration(#[from] ParseError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error("index {index} out of range (filter shows {shown} timer(s))")]
    OutOfRange { index: usize, shown: usize },

    #[error("invalid index: {0}")]
    InvalidIndex(String),

    #[error("{0}")]
    Usage(String),

    #[error("error accessing {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("malformed timer file {}: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
