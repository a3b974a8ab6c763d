use std::{io, result};

use read_fonts::ReadError;
use thiserror::Error;
use write_fonts::BuilderError;

#[derive(Debug, Error)]
pub enum Error {
    /// The caller passed an invalid or contradictory argument.
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("unknown name key: {0:?}")]
    UnknownNameKey(String),

    /// The operation does not apply to the font in its current state.
    #[error("invalid operation: {0}")]
    Operation(String),

    /// The font lacks data needed to answer a query.
    #[error("invalid font data: {0}")]
    Data(String),

    #[error("malformed font: {0}")]
    Validation(ReadError),

    #[error("font handle is closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Instancer(#[from] font_instancer::Error),

    #[error(transparent)]
    Subset(#[from] fonthandle_subsetter::Error),

    #[error(transparent)]
    Woff(#[from] fonthandle_woff::Error),

    #[error("failed to read font: {0}")]
    Read(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("failed to write font: {0}")]
    Write(#[from] write_fonts::error::Error),
}

impl Error {
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_) | Self::UnknownNameKey(_))
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_) | Self::Closed)
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = result::Result<T, Error>;
