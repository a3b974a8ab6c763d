//! Tuple regions and how they change when axes are pinned or narrowed.
//!
//! All coordinates here are normalized and already mapped through `avar`,
//! which is the space gvar tuples live in.

use read_fonts::types::F2Dot14;
use write_fonts::tables::gvar::Tent as WriteTent;

const EPSILON: f64 = 1e-9;

/// The support of a tuple on a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tent {
    pub start: f64,
    pub peak: f64,
    pub end: f64,
}

impl Tent {
    /// The region a tuple without an intermediate region has on an axis.
    pub fn implied(peak: f64) -> Self {
        Self {
            start: peak.min(0.0),
            peak,
            end: peak.max(0.0),
        }
    }

    fn mirror(self) -> Self {
        Self {
            start: -self.end,
            peak: -self.peak,
            end: -self.start,
        }
    }

    /// Regions crossing zero (or out of order) don't constrain the axis.
    fn is_ignored(&self) -> bool {
        self.start > self.peak
            || self.peak > self.end
            || (self.start < 0.0 && self.end > 0.0 && self.peak != 0.0)
    }

    pub fn is_neutral(&self) -> bool {
        self.peak == 0.0 || self.is_ignored()
    }

    pub fn scalar_at(&self, value: f64) -> f64 {
        if self.is_neutral() || value == self.peak {
            return 1.0;
        }
        if value <= self.start || value >= self.end {
            return 0.0;
        }
        if value < self.peak {
            (value - self.start) / (self.peak - self.start)
        } else {
            (self.end - value) / (self.end - self.peak)
        }
    }

    /// Re-express this tent on an axis whose range becomes `lower..=upper`
    /// with the default at `default` (`lower <= default <= upper`),
    /// renormalized so the limits sit at -1 and +1 and the default at 0.
    ///
    /// Returns the tents, with the factor their deltas must be scaled by,
    /// that together reproduce the old scalar everywhere inside the new
    /// range. A neutral tent carries what is already active at the new
    /// default.
    pub fn rebase(self, lower: f64, default: f64, upper: f64) -> Vec<(Tent, f64)> {
        if self.is_neutral() {
            return vec![(self, 1.0)];
        }

        let at_default = self.scalar_at(default);
        let mut rebased = Vec::new();
        if at_default.abs() > EPSILON {
            rebased.push((Tent::implied(0.0), at_default));
        }

        // The old scalar is linear between the tent's own points, the new
        // default and the new limits, so one hat per break reproduces it.
        let breaks = [self.start, self.peak, self.end];
        let positive = upper - default;
        if positive > EPSILON {
            let inner = breaks
                .iter()
                .filter(|x| **x > default && **x < upper)
                .map(|x| (x - default) / positive);
            let scalar = |v: f64| self.scalar_at(default + v * positive) - at_default;
            rebased.extend(hats(inner, scalar));
        }
        let negative = default - lower;
        if negative > EPSILON {
            let inner = breaks
                .iter()
                .filter(|x| **x < default && **x > lower)
                .map(|x| (default - x) / negative);
            let scalar = |v: f64| self.scalar_at(default - v * negative) - at_default;
            rebased.extend(
                hats(inner, scalar)
                    .into_iter()
                    .map(|(tent, factor)| (tent.mirror(), factor)),
            );
        }
        rebased
    }

    pub fn to_write_tent(self) -> WriteTent {
        let peak = F2Dot14::from_f32(self.peak as f32);
        let implied = Tent::implied(self.peak);
        let intermediate = ((self.start - implied.start).abs() > EPSILON
            || (self.end - implied.end).abs() > EPSILON)
            .then(|| (F2Dot14::from_f32(self.start as f32), F2Dot14::from_f32(self.end as f32)));
        WriteTent::new(peak, intermediate)
    }

    fn key(&self) -> (i16, i16, i16) {
        (
            F2Dot14::from_f32(self.start as f32).to_bits(),
            F2Dot14::from_f32(self.peak as f32).to_bits(),
            F2Dot14::from_f32(self.end as f32).to_bits(),
        )
    }
}

/// Positive hat tents over `0..=1` with breaks at `inner`, weighted so
/// their sum follows `value`, which must be zero at 0.
fn hats(inner: impl Iterator<Item = f64>, value: impl Fn(f64) -> f64) -> Vec<(Tent, f64)> {
    let mut points = vec![0.0, 1.0];
    points.extend(inner);
    points.sort_by(f64::total_cmp);
    points.dedup_by(|a, b| (*a - *b).abs() <= EPSILON);

    (1..points.len())
        .filter_map(|i| {
            let peak = points[i];
            let factor = value(peak);
            (factor.abs() > EPSILON).then(|| {
                let end = points.get(i + 1).copied().unwrap_or(peak);
                let tent = Tent {
                    start: points[i - 1],
                    peak,
                    end,
                };
                (tent, factor)
            })
        })
        .collect()
}

/// What happens to one axis of the source font, in normalized units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AxisChange {
    Keep,
    Pin(f64),
    Narrow { lower: f64, default: f64, upper: f64 },
}

/// The per-axis tents of one tuple variation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Region(pub Vec<Tent>);

impl Region {
    /// A region where every axis is neutral, i.e. the tuple is always fully
    /// applied.
    pub fn is_default(&self) -> bool {
        self.0.iter().all(Tent::is_neutral)
    }

    /// Apply `changes` to this region.
    ///
    /// Pinned axes are folded into the returned factors and removed from the
    /// regions. Narrowed axes may split a tuple, and a moved default adds a
    /// neutral part that belongs to the new default outlines.
    pub fn limit(&self, changes: &[AxisChange]) -> Vec<(Region, f64)> {
        let mut partials: Vec<(Vec<Tent>, f64)> = vec![(Vec::new(), 1.0)];

        for (tent, change) in self.0.iter().zip(changes) {
            match *change {
                AxisChange::Keep => {
                    for (tents, _) in &mut partials {
                        tents.push(*tent);
                    }
                }
                AxisChange::Pin(value) => {
                    let scalar = tent.scalar_at(value);
                    if scalar == 0.0 {
                        return Vec::new();
                    }
                    for (_, factor) in &mut partials {
                        *factor *= scalar;
                    }
                }
                AxisChange::Narrow {
                    lower,
                    default,
                    upper,
                } => {
                    let options = tent.rebase(lower, default, upper);
                    if options.is_empty() {
                        return Vec::new();
                    }
                    partials = partials
                        .into_iter()
                        .flat_map(|(tents, factor)| {
                            options.iter().map(move |(option, scale)| {
                                let mut tents = tents.clone();
                                tents.push(*option);
                                (tents, factor * scale)
                            })
                        })
                        .collect();
                }
            }
        }

        partials
            .into_iter()
            .filter(|(_, factor)| *factor != 0.0)
            .map(|(tents, factor)| (Region(tents), factor))
            .collect()
    }

    pub fn key(&self) -> Vec<(i16, i16, i16)> {
        self.0.iter().map(Tent::key).collect()
    }

    pub fn to_write_tents(&self) -> Vec<WriteTent> {
        self.0.iter().map(|tent| tent.to_write_tent()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tent(start: f64, peak: f64, end: f64) -> Tent {
        Tent { start, peak, end }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    /// Sum of the rebased tents at a new coordinate must equal the old
    /// scalar at the corresponding old coordinate.
    fn check_equivalent(original: Tent, lower: f64, default: f64, upper: f64) {
        let rebased = original.rebase(lower, default, upper);
        for step in 0..=40 {
            let new = -1.0 + step as f64 * 0.05;
            let old = if new >= 0.0 {
                default + new * (upper - default)
            } else {
                default + new * (default - lower)
            };
            let expected = original.scalar_at(old);
            let actual: f64 = rebased.iter().map(|(t, f)| t.scalar_at(new) * f).sum();
            assert_close(actual, expected);
        }
    }

    #[test]
    fn scalar_of_implied_tent() {
        let t = Tent::implied(1.0);
        assert_eq!(t.scalar_at(0.0), 0.0);
        assert_close(t.scalar_at(0.25), 0.25);
        assert_eq!(t.scalar_at(1.0), 1.0);
        assert_eq!(t.scalar_at(-0.5), 0.0);
    }

    #[test]
    fn scalar_of_intermediate_tent() {
        let t = tent(0.2, 0.5, 1.0);
        assert_eq!(t.scalar_at(0.2), 0.0);
        assert_close(t.scalar_at(0.35), 0.5);
        assert_close(t.scalar_at(0.75), 0.5);
        assert_eq!(t.scalar_at(1.0), 0.0);
    }

    #[test]
    fn zero_crossing_tent_is_ignored() {
        let t = tent(-0.5, 0.5, 1.0);
        assert_eq!(t.scalar_at(-1.0), 1.0);
        assert_eq!(t.rebase(-0.5, 0.0, 0.5), vec![(t, 1.0)]);
    }

    #[test]
    fn full_range_keeps_tent() {
        let t = Tent::implied(1.0);
        assert_eq!(t.rebase(-1.0, 0.0, 1.0), vec![(t, 1.0)]);
    }

    #[test]
    fn narrow_peak_beyond_limit() {
        let rebased = Tent::implied(1.0).rebase(-1.0, 0.0, 0.5);
        assert_eq!(rebased.len(), 1);
        assert_eq!(rebased[0].0, tent(0.0, 1.0, 1.0));
        assert_close(rebased[0].1, 0.5);
        check_equivalent(Tent::implied(1.0), -1.0, 0.0, 0.5);
    }

    #[test]
    fn narrow_peak_inside_limit_splits_descent() {
        let original = tent(0.0, 0.4, 1.0);
        assert_eq!(original.rebase(-1.0, 0.0, 0.8).len(), 2);
        check_equivalent(original, -1.0, 0.0, 0.8);
    }

    #[test]
    fn narrow_drops_tuples_starting_past_limit() {
        assert!(tent(0.6, 0.8, 1.0).rebase(-1.0, 0.0, 0.5).is_empty());
        assert!(Tent::implied(1.0).rebase(-1.0, 0.0, 0.0).is_empty());
    }

    #[test]
    fn narrow_negative_side() {
        check_equivalent(Tent::implied(-1.0), -0.25, 0.0, 1.0);
        check_equivalent(tent(-1.0, -0.5, 0.0), -0.75, 0.0, 1.0);
    }

    #[test]
    fn moved_default_splits_off_neutral_part() {
        // wght 100..400..900 sliced to 500..900 with 500 as the default
        let rebased = Tent::implied(1.0).rebase(0.2, 0.2, 1.0);
        assert_eq!(rebased.len(), 2);
        assert!(rebased[0].0.is_neutral());
        assert_close(rebased[0].1, 0.2);
        assert_eq!(rebased[1].0, tent(0.0, 1.0, 1.0));
        assert_close(rebased[1].1, 0.8);
        check_equivalent(Tent::implied(1.0), 0.2, 0.2, 1.0);
    }

    #[test]
    fn moved_default_inside_range() {
        check_equivalent(Tent::implied(1.0), -1.0, 0.5, 1.0);
        check_equivalent(Tent::implied(-1.0), -1.0, 0.5, 1.0);
        check_equivalent(tent(0.2, 0.6, 0.9), -0.5, 0.4, 0.8);
        check_equivalent(tent(-0.8, -0.3, 0.0), -1.0, -0.5, 0.5);
    }

    #[test]
    fn default_at_peak_is_fully_folded() {
        // default at the peak: fully active there, fading towards the limits
        let rebased = tent(0.0, 0.5, 1.0).rebase(0.0, 0.5, 1.0);
        assert!(rebased[0].0.is_neutral());
        assert_close(rebased[0].1, 1.0);
        check_equivalent(tent(0.0, 0.5, 1.0), 0.0, 0.5, 1.0);
    }

    #[test]
    fn limit_folds_pinned_axes() {
        let region = Region(vec![Tent::implied(1.0), Tent::implied(1.0)]);
        let limited = region.limit(&[AxisChange::Pin(0.5), AxisChange::Keep]);
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].0, Region(vec![Tent::implied(1.0)]));
        assert_close(limited[0].1, 0.5);
    }

    #[test]
    fn limit_pin_outside_region_drops_tuple() {
        let region = Region(vec![Tent::implied(1.0)]);
        assert!(region.limit(&[AxisChange::Pin(-0.5)]).is_empty());
    }

    #[test]
    fn limit_pin_only_region_becomes_default() {
        let region = Region(vec![Tent::implied(1.0), Tent::implied(0.0)]);
        let limited = region.limit(&[AxisChange::Pin(1.0), AxisChange::Keep]);
        assert_eq!(limited.len(), 1);
        assert!(limited[0].0.is_default());
        assert_eq!(limited[0].1, 1.0);
    }
}
