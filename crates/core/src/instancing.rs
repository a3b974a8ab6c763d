//! The engine that realizes pinned and sliced axes.

use font_instancer::{AxisLimit, InstancerOptions};

use crate::error::Result;

/// Applies axis limits to variable font data.
///
/// [`FontHandle`](crate::FontHandle) validates coordinates and keeps names
/// consistent; the instancer only rewrites outlines and variation tables.
pub trait Instancer: Send + Sync {
    fn instantiate(
        &self,
        data: &[u8],
        limits: &[AxisLimit],
        options: &InstancerOptions,
    ) -> Result<Vec<u8>>;
}

/// [`font_instancer::instantiate`], for TrueType-outline variable fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInstancer;

impl Instancer for DefaultInstancer {
    fn instantiate(
        &self,
        data: &[u8],
        limits: &[AxisLimit],
        options: &InstancerOptions,
    ) -> Result<Vec<u8>> {
        Ok(font_instancer::instantiate(data, limits, options)?)
    }
}
