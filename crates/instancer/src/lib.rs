//! # Font Instancer
//!
//! Pin or narrow the axes of TrueType-outline variable fonts.
//!
//! Pinning every axis produces a static font. Pinning some axes, or
//! restricting their range, produces a smaller variable font: pinned axes
//! disappear from `fvar`, narrowed axes get new limits and, when the old
//! default falls outside them or another one is asked for, a new default.
//!
//! ## Example
//!
//! ```no_run
//! use font_instancer::{AxisLimit, InstancerOptions, instantiate};
//!
//! let vf_data = std::fs::read("variable.ttf").unwrap();
//!
//! // Static Bold
//! let limits = [AxisLimit::pin("wght", 700.0), AxisLimit::at_default("wdth")];
//! let bold = instantiate(&vf_data, &limits, &InstancerOptions::default()).unwrap();
//!
//! // Light to Regular, width left variable
//! let limits = [AxisLimit::range("wght", 300.0, 400.0)];
//! let sliced = instantiate(&vf_data, &limits, &InstancerOptions::default()).unwrap();
//!
//! // SemiBold to Black with SemiBold as the new default
//! let limits = [AxisLimit::range("wght", 600.0, 900.0).with_default(600.0)];
//! let heavy = instantiate(&vf_data, &limits, &InstancerOptions::default()).unwrap();
//! # let _ = (bold, sliced, heavy);
//! ```

mod error;
mod instancer;
mod location;
mod metrics;
mod outline;
mod overlap;
mod partial;
mod region;

pub use error::{Error, Result};
pub use location::{AxisLimit, Limit};
use log::{debug, info, warn};
use read_fonts::{FontRef, TableProvider};

use crate::location::{AxisInfo, AxisPlan, pinned_axes};

/// What to do with overlapping contours in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapMode {
    /// Keep overlaps, leave the overlap flags cleared.
    KeepAndDontSetFlags,
    /// Keep overlaps and mark every glyph as possibly overlapping.
    #[default]
    KeepAndSetFlags,
    /// Remove overlaps. Not supported: contours are kept as-is and the
    /// overlap flags are cleared, as they would be after removal.
    Remove,
}

/// Options for [`instantiate`].
#[derive(Debug, Clone, Copy)]
pub struct InstancerOptions {
    /// Merge and prune variation tuples after rebasing.
    pub optimize: bool,
    pub overlap: OverlapMode,
}

impl Default for InstancerOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            overlap: OverlapMode::default(),
        }
    }
}

impl InstancerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_overlap(mut self, overlap: OverlapMode) -> Self {
        self.overlap = overlap;
        self
    }
}

/// Apply `limits` to a variable font.
///
/// Axes without a limit are left untouched. When every axis ends up
/// pinned the result is a static font without variation tables.
///
/// # Errors
///
/// - `Error::NotVariableFont` if the font has no fvar table
/// - `Error::NoCff2Support` if the font uses CFF outlines (no glyf table)
/// - `Error::NoGvar` if the font has no gvar table
/// - `Error::AxisNotFound` for limits naming an axis the font lacks
/// - `Error::InvalidRange` for inverted ranges or ranges outside the axis
pub fn instantiate(
    data: &[u8],
    limits: &[AxisLimit],
    options: &InstancerOptions,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let fvar = font.fvar().map_err(|_| Error::NotVariableFont)?;
    font.glyf().map_err(|_| Error::NoCff2Support)?;
    font.gvar().map_err(|_| Error::NoGvar)?;

    let axes = AxisInfo::read_all(&fvar)?;
    let plans = location::resolve(&axes, limits)?;

    let output = if plans.iter().all(|plan| matches!(plan, AxisPlan::Pin(_))) {
        let pinned = pinned_axes(&axes, &plans);
        let output = instancer::pin_all(&font, &pinned)?;
        info!("instantiated static font at {pinned:?}");
        output
    } else if plans.iter().all(|plan| *plan == AxisPlan::Keep) {
        debug!("no axis limited, outlines left unchanged");
        data.to_vec()
    } else {
        let output = partial::instantiate_partial(&font, &axes, &plans, options)?;
        info!("instantiated partial variable font with {plans:?}");
        output
    };

    match options.overlap {
        OverlapMode::KeepAndSetFlags => overlap::set_overlap_flags(&output),
        OverlapMode::KeepAndDontSetFlags => Ok(output),
        OverlapMode::Remove => {
            warn!("overlap removal is not supported, overlapping contours are kept");
            overlap::clear_overlap_flags(&output)
        }
    }
}
