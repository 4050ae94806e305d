// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot resolve config path: {0}")]
    PathResolution(String),

    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create temp file {}: {source}", path.display())]
    CreateTemp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("too many outputs ({count}, max {max})")]
    TooManyOutputs { count: usize, max: usize },

    #[error("no outputs to store")]
    NoOutputs,

    /// The output's name can't be written so that it reads back the same.
    #[error("output {name:?} cannot be written as a config line")]
    UnrepresentableOutput { name: String },

    /// The matched block no longer has the shape the scanner reported.
    #[error("profile changed on disk: expected {expected} output lines, found {found}")]
    ReplacementCountMismatch { expected: usize, found: usize },
}
