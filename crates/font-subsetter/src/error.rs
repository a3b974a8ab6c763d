use std::result;

use read_fonts::ReadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("harfbuzz: {0}")]
    HarfBuzz(String),

    #[error("invalid unicode value: {0:?}")]
    InvalidUnicode(String),

    #[error("subset is empty: no unicodes, glyphs or text given")]
    NothingToKeep,
}

pub type Result<T> = result::Result<T, Error>;
