use std::result;

use read_fonts::ReadError;
use write_fonts::BuilderError;

/// Errors raised while rewriting font tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Read(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),
}

pub type Result<T> = result::Result<T, Error>;
