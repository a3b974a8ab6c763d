//! Axis limits and their resolution against `fvar`.

use log::debug;
use read_fonts::{tables::fvar::Fvar, types::Tag};

use crate::error::{Error, Result};

const EPSILON: f64 = 1e-6;

pub(crate) fn tag_from_str(tag: &str) -> Tag {
    let mut tag_bytes = [b' '; 4];
    for (dst, src) in tag_bytes.iter_mut().zip(tag.as_bytes().iter()) {
        *dst = *src;
    }
    Tag::new(&tag_bytes)
}

/// What to do with one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    /// Pin the axis at its default value.
    Default,
    /// Pin the axis at a user-space value.
    Pin(f32),
    /// Keep the axis variable, restricted to `min..=max`.
    ///
    /// The new default is `default` when given, otherwise the current one.
    /// Either is clamped into the range.
    Range {
        min: f32,
        default: Option<f32>,
        max: f32,
    },
}

/// A [`Limit`] for the axis `tag`. Axes without a limit are left untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimit {
    pub tag: Tag,
    pub limit: Limit,
}

impl AxisLimit {
    pub fn pin(tag: &str, value: f32) -> Self {
        Self {
            tag: tag_from_str(tag),
            limit: Limit::Pin(value),
        }
    }

    pub fn at_default(tag: &str) -> Self {
        Self {
            tag: tag_from_str(tag),
            limit: Limit::Default,
        }
    }

    pub fn range(tag: &str, min: f32, max: f32) -> Self {
        Self {
            tag: tag_from_str(tag),
            limit: Limit::Range {
                min,
                default: None,
                max,
            },
        }
    }

    /// Set the default of a range limit. No effect on pins.
    pub fn with_default(mut self, value: f32) -> Self {
        if let Limit::Range { default, .. } = &mut self.limit {
            *default = Some(value);
        }
        self
    }
}

/// An fvar axis in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AxisInfo {
    pub tag: Tag,
    pub min: f64,
    pub default: f64,
    pub max: f64,
}

impl AxisInfo {
    pub fn read_all(fvar: &Fvar) -> Result<Vec<Self>> {
        Ok(fvar
            .axes()?
            .iter()
            .map(|axis| Self {
                tag: axis.axis_tag(),
                min: axis.min_value().to_f64(),
                default: axis.default_value().to_f64(),
                max: axis.max_value().to_f64(),
            })
            .collect())
    }

    /// Default normalization, before any avar mapping.
    pub fn normalize(&self, value: f64) -> f64 {
        let value = value.clamp(self.min, self.max);
        if value < self.default && self.default > self.min {
            (value - self.default) / (self.default - self.min)
        } else if value > self.default && self.max > self.default {
            (value - self.default) / (self.max - self.default)
        } else {
            0.0
        }
    }

    /// The user-space value of a normalized coordinate.
    pub fn denormalize(&self, value: f64) -> f64 {
        if value < 0.0 {
            self.default + value * (self.default - self.min)
        } else {
            self.default + value * (self.max - self.default)
        }
    }
}

/// Resolved intent for one axis, in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AxisPlan {
    Keep,
    Pin(f64),
    Narrow { min: f64, default: f64, max: f64 },
}

/// An axis pinned at a user-space value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PinnedAxis {
    pub tag: Tag,
    pub value: f64,
}

/// The pinned axes of `plans`, in fvar order.
pub(crate) fn pinned_axes(axes: &[AxisInfo], plans: &[AxisPlan]) -> Vec<PinnedAxis> {
    axes.iter()
        .zip(plans)
        .filter_map(|(axis, plan)| match plan {
            AxisPlan::Pin(value) => Some(PinnedAxis { tag: axis.tag, value: *value }),
            _ => None,
        })
        .collect()
}

/// Match limits to fvar axes. Later limits for the same tag win.
pub(crate) fn resolve(axes: &[AxisInfo], limits: &[AxisLimit]) -> Result<Vec<AxisPlan>> {
    let mut plans = vec![AxisPlan::Keep; axes.len()];

    for limit in limits {
        let index = axes
            .iter()
            .position(|axis| axis.tag == limit.tag)
            .ok_or_else(|| Error::AxisNotFound(limit.tag.to_string()))?;
        plans[index] = resolve_one(&axes[index], limit.limit)?;
    }

    Ok(plans)
}

fn resolve_one(axis: &AxisInfo, limit: Limit) -> Result<AxisPlan> {
    match limit {
        Limit::Default => Ok(AxisPlan::Pin(axis.default)),
        Limit::Pin(value) => {
            let value = f64::from(value);
            let clamped = value.clamp(axis.min, axis.max);
            if clamped != value {
                debug!("{}={value} clamped to {clamped}", axis.tag);
            }
            Ok(AxisPlan::Pin(clamped))
        }
        Limit::Range { min, default, max } => {
            let invalid = || Error::InvalidRange {
                tag: axis.tag.to_string(),
                min,
                max,
            };
            if min > max {
                return Err(invalid());
            }
            let lo = f64::from(min).max(axis.min);
            let hi = f64::from(max).min(axis.max);
            if lo > hi {
                return Err(invalid());
            }

            let requested = default.map_or(axis.default, f64::from);
            let new_default = requested.clamp(lo, hi);
            if (new_default - requested).abs() > EPSILON {
                debug!("{} default {requested} clamped to {new_default}", axis.tag);
            }

            if hi - lo <= EPSILON {
                Ok(AxisPlan::Pin(new_default))
            } else if lo <= axis.min
                && hi >= axis.max
                && (new_default - axis.default).abs() <= EPSILON
            {
                Ok(AxisPlan::Keep)
            } else {
                Ok(AxisPlan::Narrow {
                    min: lo,
                    default: new_default,
                    max: hi,
                })
            }
        }
    }
}
