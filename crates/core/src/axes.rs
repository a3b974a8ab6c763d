//! Variation axes, named instances and coordinate specs.

use font_instancer::AxisLimit;
use indexmap::IndexMap;

use crate::distance::Coordinates;

/// Display names for registered and Google Fonts axes.
static AXIS_NAMES: [(&str, &str); 13] = [
    ("ital", "Italic"),
    ("opsz", "Optical Size"),
    ("slnt", "Slant"),
    ("wdth", "Width"),
    ("wght", "Weight"),
    ("CASL", "Casual"),
    ("CRSV", "Cursive"),
    ("XPRN", "Expression"),
    ("FILL", "Fill"),
    ("GRAD", "Grade"),
    ("MONO", "Monospace"),
    ("SOFT", "Softness"),
    ("WONK", "Wonky"),
];

/// A variation axis in user space.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableAxis {
    pub tag: String,
    pub name: String,
    pub min_value: f64,
    pub default_value: f64,
    pub max_value: f64,
}

/// A named instance declared in `fvar`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInstance {
    pub coordinates: Coordinates,
    pub style_name: String,
    pub postscript_name: Option<String>,
}

/// Display name for an axis tag, the tag in title case when unknown.
pub fn axis_name(tag: &str) -> String {
    if let Some((_, name)) = AXIS_NAMES.iter().find(|(known, _)| *known == tag) {
        return name.to_string();
    }
    let mut name = String::with_capacity(tag.len());
    let mut after_letter = false;
    for c in tag.chars() {
        if after_letter {
            name.extend(c.to_lowercase());
        } else {
            name.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    name
}

/// How one axis should be instanced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisValue {
    /// Leave at the axis default.
    Default,
    Pin(f64),
    /// Narrow the axis range. `default`, when given, becomes the new default.
    Range {
        min: f64,
        default: Option<f64>,
        max: f64,
    },
    /// A range where missing bounds are taken from the axis.
    Limits {
        min: Option<f64>,
        default: Option<f64>,
        max: Option<f64>,
    },
}

/// Axis tag to [`AxisValue`], in insertion order.
pub type CoordinateSpec = IndexMap<String, AxisValue>;

impl AxisValue {
    pub fn range(min: f64, max: f64) -> Self {
        Self::Range {
            min,
            default: None,
            max,
        }
    }

    /// A scalar or the default marker.
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Default | Self::Pin(_))
    }

    /// `(min, default, max)` of a range, with missing values taken from
    /// `axis`. `None` for pins.
    fn bounds(self, axis: &VariableAxis) -> Option<(f64, Option<f64>, f64)> {
        match self {
            Self::Default | Self::Pin(_) => None,
            Self::Range { min, default, max } => Some((min, default, max)),
            Self::Limits { min, default, max } => Some((
                min.unwrap_or(axis.min_value),
                Some(default.unwrap_or(axis.default_value)),
                max.unwrap_or(axis.max_value),
            )),
        }
    }

    /// Fill [`AxisValue::Limits`] from the axis, turning it into a range.
    pub fn normalize(self, axis: &VariableAxis) -> Self {
        match self.bounds(axis) {
            Some((min, default, max)) => Self::Range { min, default, max },
            None => self,
        }
    }

    /// The instancer limit for `axis`. A range with equal bounds pins.
    pub(crate) fn to_limit(self, axis: &VariableAxis) -> AxisLimit {
        let tag = axis.tag.as_str();
        match (self, self.bounds(axis)) {
            (Self::Pin(value), _) => AxisLimit::pin(tag, value as f32),
            (_, Some((min, _, max))) if min == max => AxisLimit::pin(tag, min as f32),
            (_, Some((min, default, max))) => {
                let limit = AxisLimit::range(tag, min as f32, max as f32);
                match default {
                    Some(default) => limit.with_default(default as f32),
                    None => limit,
                }
            }
            (Self::Default, _) | (_, None) => AxisLimit::at_default(tag),
        }
    }
}

impl From<f64> for AxisValue {
    fn from(value: f64) -> Self {
        Self::Pin(value)
    }
}

impl From<Option<f64>> for AxisValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Default, Self::Pin)
    }
}

impl From<(f64, f64)> for AxisValue {
    fn from((min, max): (f64, f64)) -> Self {
        Self::range(min, max)
    }
}

impl From<(f64, f64, f64)> for AxisValue {
    fn from((min, default, max): (f64, f64, f64)) -> Self {
        Self::Range {
            min,
            default: Some(default),
            max,
        }
    }
}

impl From<[f64; 2]> for AxisValue {
    fn from([min, max]: [f64; 2]) -> Self {
        Self::range(min, max)
    }
}

impl From<[f64; 3]> for AxisValue {
    fn from([min, default, max]: [f64; 3]) -> Self {
        (min, default, max).into()
    }
}

/// True when every value is a scalar or the default marker.
pub fn all_axes_pinned(coordinates: &CoordinateSpec) -> bool {
    coordinates.values().all(AxisValue::is_pinned)
}

/// Build a [`CoordinateSpec`] from `(tag, value)` pairs.
///
/// ```
/// use fonthandle::{AxisValue, coordinates};
///
/// let spec = coordinates([("wght", AxisValue::from((300.0, 700.0))), ("wdth", 100.0.into())]);
/// assert_eq!(spec.len(), 2);
/// ```
pub fn coordinates<K, V>(values: impl IntoIterator<Item = (K, V)>) -> CoordinateSpec
where
    K: Into<String>,
    V: Into<AxisValue>,
{
    values.into_iter().map(|(tag, value)| (tag.into(), value.into())).collect()
}
