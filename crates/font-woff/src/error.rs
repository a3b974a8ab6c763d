use std::{io, result};

use read_fonts::ReadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("unrecognized font format")]
    UnknownFormat,

    #[error("invalid WOFF file: {0}")]
    InvalidWoff(String),

    #[error("zlib: {0}")]
    Zlib(#[from] io::Error),

    #[error("WOFF2 compression failed")]
    Woff2Encode,

    #[error("WOFF2 decompression failed")]
    Woff2Decode,
}

pub type Result<T> = result::Result<T, Error>;
