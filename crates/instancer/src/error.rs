use std::result;

use read_fonts::ReadError;
use write_fonts::{BuilderError, error, tables::gvar::GvarInputError};

/// Error types for the instancer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("not a variable font (no fvar table)")]
    NotVariableFont,

    #[error("no glyf table (CFF/CFF2 fonts not supported)")]
    NoCff2Support,

    #[error("no gvar table")]
    NoGvar,

    #[error("axis not found: {0}")]
    AxisNotFound(String),

    #[error("invalid range {min}..{max} for {tag}")]
    InvalidRange { tag: String, min: f32, max: f32 },

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("failed to write table: {0}")]
    Write(#[from] error::Error),

    #[error("failed to build gvar table: {0:?}")]
    GvarBuild(GvarInputError),
}

pub type Result<T> = result::Result<T, Error>;
