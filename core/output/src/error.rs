//! FILENAME: core/output/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error opening output file `{path}`: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("output format `{0}` is not supported by this build")]
    UnsupportedFormat(String),
}
