//! # fonthandle
//!
//! Human-friendly operations on OpenType, TrueType, WOFF and WOFF2 fonts.
//!
//! A [`FontHandle`] owns one font in memory. Through it you can read and
//! edit names, style flags and vertical metrics, rename a family, pin a
//! variable font to a static instance or slice its axes, subset it, and
//! save it in any of the four formats.
//!
//! ## Example
//!
//! ```no_run
//! use fonthandle::{FontHandle, SaveOptions, StaticOptions, coordinates};
//!
//! let mut font = FontHandle::from_path("Inter[wght].ttf").unwrap();
//! let spec = coordinates([("wght", 650.0)]);
//! font.to_static(Some(&spec), None, StaticOptions::default()).unwrap();
//! font.save_as_woff2(Some("out/".as_ref()), SaveOptions::default()).unwrap();
//! ```

mod axes;
mod distance;
mod error;
mod filename;
mod flags;
mod glyphs;
mod handle;
mod instancing;
mod metrics;
mod names;
mod rename;
mod style;
mod subset;
mod variable;

pub use axes::{
    AxisValue, CoordinateSpec, VariableAxis, VariableInstance, all_axes_pinned, axis_name,
    coordinates,
};
pub use distance::{Coordinates, distance};
pub use error::{Error, Result};
pub use filename::FilenameOptions;
pub use flags::{get_flag, set_flag};
pub use font_instancer::{InstancerOptions, OverlapMode};
pub use fonthandle_woff::{Flavor, FontFormat};
pub use glyphs::{Character, Glyph};
pub use handle::{FontHandle, FontSource, SaveOptions};
pub use instancing::{DefaultInstancer, Instancer};
pub use metrics::{ItalicAngle, VerticalMetrics, WeightInfo, WidthInfo};
pub use names::{NAMES, NameKey, name_key, resolve_name_id};
pub use rename::{full_name, postscript_name};
pub use style::{StyleFlag, StyleFlags};
pub use subset::SubsetOptions;
pub use variable::StaticOptions;

/// Name ids used by the renaming helpers.
pub mod name_ids {
    pub use crate::names::{
        COPYRIGHT_NOTICE, FAMILY_NAME, FULL_NAME, POSTSCRIPT_NAME, SUBFAMILY_NAME,
        TYPOGRAPHIC_FAMILY_NAME, TYPOGRAPHIC_SUBFAMILY_NAME, UNIQUE_IDENTIFIER, VERSION,
        WWS_FAMILY_NAME, WWS_SUBFAMILY_NAME,
    };
}

/// The axis limits handed to an [`Instancer`].
pub use font_instancer::{AxisLimit, Limit};
