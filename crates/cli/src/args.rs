//! Value parsers shared by the subcommands.

use clap::ValueEnum;
use fonthandle::{AxisValue, Flavor, NameKey, OverlapMode};

/// Parse `TAG=VALUE` into an axis tag and how to instance it.
///
/// - `wght=400` pins the axis
/// - `wght=default` keeps the axis default
/// - `wght=100:700` or `wght=100:400:700` limits the range
/// - `wght=:700` or `wght=300:` take the missing bound from the font
pub fn parse_axis(s: &str) -> Result<(String, AxisValue), String> {
    let (tag, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid axis format '{s}', expected TAG=VALUE"))?;
    let tag = tag.trim();
    if tag.is_empty() || tag.len() > 4 {
        return Err(format!("Invalid axis tag '{tag}'"));
    }

    let bound = |part: &str| -> Result<Option<f64>, String> {
        let part = part.trim();
        if part.is_empty() {
            return Ok(None);
        }
        part.parse()
            .map(Some)
            .map_err(|_| format!("Invalid value '{part}' for axis '{tag}'"))
    };

    let parts: Vec<&str> = value.split(':').collect();
    let value = match parts.as_slice() {
        [single] if single.trim().eq_ignore_ascii_case("default") => AxisValue::Default,
        [single] => bound(single)?
            .map(AxisValue::Pin)
            .ok_or_else(|| format!("Missing value for axis '{tag}'"))?,
        [min, max] => match (bound(min)?, bound(max)?) {
            (Some(min), Some(max)) => AxisValue::range(min, max),
            (min, max) => AxisValue::Limits {
                min,
                default: None,
                max,
            },
        },
        [min, default, max] => match (bound(min)?, bound(default)?, bound(max)?) {
            (Some(min), default, Some(max)) => AxisValue::Range { min, default, max },
            (min, default, max) => AxisValue::Limits { min, default, max },
        },
        _ => return Err(format!("Too many ':' separated values for axis '{tag}'")),
    };
    Ok((tag.to_string(), value))
}

/// Parse `KEY=VALUE`, where the key is a name id or a key like `family_name`.
pub fn parse_name_assignment(s: &str) -> Result<(NameKey, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid name format '{s}', expected KEY=VALUE"))?;
    let key = key.parse::<NameKey>().map_err(|e| e.to_string())?;
    Ok((key, value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Ttf,
    Woff,
    Woff2,
}

impl Format {
    /// The flavor to set on a handle. OpenType and TrueType are both bare sfnt.
    pub fn flavor(self) -> Option<Flavor> {
        match self {
            Format::Ttf => None,
            Format::Woff => Some(Flavor::Woff),
            Format::Woff2 => Some(Flavor::Woff2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Overlap {
    /// Keep overlaps and leave the glyf overlap flags untouched.
    Keep,
    /// Keep overlaps and mark glyphs with the overlap flag.
    #[default]
    Flag,
    Remove,
}

impl From<Overlap> for OverlapMode {
    fn from(overlap: Overlap) -> Self {
        match overlap {
            Overlap::Keep => OverlapMode::KeepAndDontSetFlags,
            Overlap::Flag => OverlapMode::KeepAndSetFlags,
            Overlap::Remove => OverlapMode::Remove,
        }
    }
}
