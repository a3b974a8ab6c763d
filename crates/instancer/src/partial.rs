//! Partial instancing: some axes stay variable.
//!
//! Pinned axes are folded into the outlines and removed; narrowed axes are
//! renormalized so the new limits sit at -1/+1 and the new default at 0,
//! with avar keeping user coordinates where they were. Whatever the old
//! tuples contribute at a moved default goes into the default outlines.

use std::collections::HashMap;

use kurbo::Vec2;
use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::{fvar::Fvar, gvar::Gvar as ReadGvar},
    types::{F2Dot14, Fixed, GlyphId, Tag},
};
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        avar::{Avar, AxisValueMap, SegmentMaps},
        fvar::{AxisInstanceArrays, Fvar as WriteFvar, InstanceRecord, VariationAxisRecord},
        gpos::Gpos,
        gsub::Gsub,
        gvar::{GlyphDelta, GlyphDeltas, GlyphVariations, Gvar},
    },
};

use crate::{
    InstancerOptions,
    error::{Error, Result},
    instancer::{REMOVED_TABLES, REPLACED_TABLES},
    location::{AxisInfo, AxisPlan, PinnedAxis},
    metrics,
    outline::{self, VarGlyph, clamp_i16},
    region::{AxisChange, Region, Tent},
};

const REBUILT_TABLES: [Tag; 3] = [Tag::new(b"fvar"), Tag::new(b"gvar"), Tag::new(b"avar")];

/// Variation data that isn't rebased and is dropped instead.
const DROPPED_TABLES: [Tag; 4] = [
    Tag::new(b"cvar"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
];

const EPSILON: f64 = 1e-6;

/// Piecewise linear avar segment map, as (from, to) pairs.
#[derive(Debug, Clone, PartialEq)]
struct SegmentMap(Vec<(f64, f64)>);

impl SegmentMap {
    fn identity() -> Self {
        Self(vec![(-1.0, -1.0), (0.0, 0.0), (1.0, 1.0)])
    }

    fn is_identity(&self) -> bool {
        self.0.iter().all(|(from, to)| (from - to).abs() <= EPSILON)
    }

    fn apply(&self, value: f64) -> f64 {
        let maps = &self.0;
        let Some(&(first_from, first_to)) = maps.first() else {
            return value;
        };
        if value <= first_from {
            return value - first_from + first_to;
        }
        for pair in maps.windows(2) {
            let ((from0, to0), (from1, to1)) = (pair[0], pair[1]);
            if value <= from1 {
                if from1 == from0 {
                    return to1;
                }
                return to0 + (value - from0) / (from1 - from0) * (to1 - to0);
            }
        }
        let (last_from, last_to) = maps[maps.len() - 1];
        value - last_from + last_to
    }

    fn to_write(&self) -> SegmentMaps {
        SegmentMaps {
            axis_value_maps: self
                .0
                .iter()
                .map(|(from, to)| AxisValueMap {
                    from_coordinate: F2Dot14::from_f32(*from as f32),
                    to_coordinate: F2Dot14::from_f32(*to as f32),
                })
                .collect(),
        }
    }
}

fn read_segment_maps(font: &FontRef, axis_count: usize) -> Vec<SegmentMap> {
    let mut maps = vec![SegmentMap::identity(); axis_count];
    let Ok(avar) = font.avar() else {
        return maps;
    };
    let avar: Avar = avar.to_owned_table();
    for (slot, segment) in maps.iter_mut().zip(avar.axis_segment_maps) {
        if !segment.axis_value_maps.is_empty() {
            *slot = SegmentMap(
                segment
                    .axis_value_maps
                    .iter()
                    .map(|m| (f64::from(m.from_coordinate.to_f32()), f64::from(m.to_coordinate.to_f32())))
                    .collect(),
            );
        }
    }
    maps
}

/// One axis of the source font, with everything needed to rewrite it.
struct AxisWork {
    info: AxisInfo,
    plan: AxisPlan,
    map: SegmentMap,
    change: AxisChange,
}

impl AxisWork {
    fn new(info: AxisInfo, plan: AxisPlan, map: SegmentMap) -> Self {
        let change = match plan {
            AxisPlan::Keep => AxisChange::Keep,
            AxisPlan::Pin(value) => AxisChange::Pin(map.apply(info.normalize(value))),
            AxisPlan::Narrow { min, default, max } => AxisChange::Narrow {
                lower: map.apply(info.normalize(min)),
                default: map.apply(info.normalize(default)),
                upper: map.apply(info.normalize(max)),
            },
        };
        Self {
            info,
            plan,
            map,
            change,
        }
    }

    fn is_kept(&self) -> bool {
        !matches!(self.plan, AxisPlan::Pin(_))
    }

    /// The user-space default after instancing, for axes whose default moved.
    fn moved_default(&self) -> Option<f64> {
        match self.plan {
            AxisPlan::Narrow { default, .. } if (default - self.info.default).abs() > EPSILON => {
                Some(default)
            }
            _ => None,
        }
    }

    /// The old post-avar coordinate the new default corresponds to.
    fn default_coord(&self) -> f64 {
        match self.change {
            AxisChange::Keep => 0.0,
            AxisChange::Pin(value) => value,
            AxisChange::Narrow { default, .. } => default,
        }
    }

    /// The avar map of a kept axis.
    ///
    /// Every user-space location where the old map or the renormalization
    /// bends becomes a segment, so the old post-avar coordinate of any user
    /// value lands on the same point of the rebased tuples.
    fn new_map(&self) -> SegmentMap {
        let (
            AxisPlan::Narrow { min, default, max },
            AxisChange::Narrow {
                lower,
                default: center,
                upper,
            },
        ) = (self.plan, self.change)
        else {
            return self.map.clone();
        };
        let axis = AxisInfo {
            tag: self.info.tag,
            min,
            default,
            max,
        };
        let rebase = |post: f64| {
            if post >= center {
                if upper - center > EPSILON {
                    (post - center) / (upper - center)
                } else {
                    0.0
                }
            } else if center - lower > EPSILON {
                (post - center) / (center - lower)
            } else {
                0.0
            }
        };

        let mut users = vec![min, default, max, self.info.default];
        users.extend(self.map.0.iter().map(|(from, _)| self.info.denormalize(*from)));
        users.retain(|user| *user >= min && *user <= max);
        users.sort_by(f64::total_cmp);

        let mut maps: Vec<(f64, f64)> = vec![(-1.0, -1.0), (0.0, 0.0), (1.0, 1.0)];
        maps.extend(users.into_iter().map(|user| {
            let to = rebase(self.map.apply(self.info.normalize(user)));
            (axis.normalize(user), to.clamp(-1.0, 1.0))
        }));
        maps.sort_by(|a, b| a.0.total_cmp(&b.0));
        maps.dedup_by(|a, b| (a.0 - b.0).abs() <= EPSILON);
        SegmentMap(maps)
    }

    /// New user-space `(min, default, max)`.
    fn new_axis(&self) -> (f64, f64, f64) {
        match self.plan {
            AxisPlan::Narrow { min, default, max } => (min, default, max),
            _ => (self.info.min, self.info.default, self.info.max),
        }
    }

    /// Whether a named instance coordinate survives this axis' change.
    fn accepts(&self, value: f64) -> bool {
        match self.plan {
            AxisPlan::Keep => true,
            AxisPlan::Pin(pinned) => (value - pinned).abs() <= EPSILON,
            AxisPlan::Narrow { min, max, .. } => value >= min - EPSILON && value <= max + EPSILON,
        }
    }
}

pub(crate) fn instantiate_partial(
    font: &FontRef,
    axes: &[AxisInfo],
    plans: &[AxisPlan],
    options: &InstancerOptions,
) -> Result<Vec<u8>> {
    let fvar = font.fvar().map_err(|_| Error::NotVariableFont)?;
    let glyf = font.glyf().map_err(|_| Error::NoCff2Support)?;
    let loca = font.loca(None).map_err(|_| Error::NoCff2Support)?;
    let gvar = font.gvar().map_err(|_| Error::NoGvar)?;

    let maps = read_segment_maps(font, axes.len());
    let work: Vec<AxisWork> = axes
        .iter()
        .zip(plans)
        .zip(maps)
        .map(|((info, plan), map)| AxisWork::new(*info, *plan, map))
        .collect();
    let changes: Vec<AxisChange> = work.iter().map(|w| w.change).collect();
    debug!("partial instance with {changes:?}");

    let kept_axis_count = work.iter().filter(|w| w.is_kept()).count();
    let axes_removed = kept_axis_count < work.len();

    // The old location the new default instance corresponds to.
    let default_coords: Vec<F2Dot14> = work
        .iter()
        .map(|w| F2Dot14::from_f32(w.default_coord() as f32))
        .collect();
    let relocated: Vec<PinnedAxis> = work
        .iter()
        .filter_map(|w| match w.plan {
            AxisPlan::Pin(value) => Some(PinnedAxis { tag: w.info.tag, value }),
            _ => w.moved_default().map(|value| PinnedAxis { tag: w.info.tag, value }),
        })
        .collect();

    let num_glyphs = font.maxp()?.num_glyphs() as u32;
    let hmtx = font.hmtx()?;
    let hhea = font.hhea()?;

    let mut glyphs = Vec::with_capacity(num_glyphs as usize);
    let mut advances: Vec<u16> = Vec::with_capacity(num_glyphs as usize);
    let mut lsbs: Vec<i16> = Vec::with_capacity(num_glyphs as usize);
    let mut variations = Vec::with_capacity(num_glyphs as usize);

    for glyph_id in 0..num_glyphs {
        let gid = GlyphId::new(glyph_id);
        let mut glyph = VarGlyph::read(&loca, &glyf, gid)?;
        let tuples = limit_glyph_tuples(&gvar, gid, &mut glyph, &changes, axes.len());
        let tuples = if options.optimize {
            optimize_tuples(tuples)
        } else {
            tuples
        };

        let orig_advance = hmtx.advance(gid).unwrap_or(0);
        let new_advance = (f64::from(orig_advance) + glyph.advance_delta()).round().max(0.0);
        advances.push(new_advance.min(f64::from(u16::MAX)) as u16);
        lsbs.push(hmtx.side_bearing(gid).unwrap_or(0));
        glyphs.push(glyph.to_glyph());

        let deltas = tuples
            .into_iter()
            .map(|(region, deltas)| {
                let deltas = deltas
                    .iter()
                    .map(|d| {
                        GlyphDelta::required(
                            clamp_i16(d.x.round() as i32),
                            clamp_i16(d.y.round() as i32),
                        )
                    })
                    .collect();
                GlyphDeltas::new(region.to_write_tents(), deltas)
            })
            .collect();
        variations.push(GlyphVariations::new(gid, deltas));
    }

    let outlines = outline::assemble(
        glyphs,
        &advances,
        &lsbs,
        hhea.number_of_h_metrics() as usize,
    )?;
    let (new_glyf, new_loca, loca_format) = &outlines.glyf_loca;
    let mvar = font.mvar().ok();

    let mut builder = FontBuilder::new();
    builder.add_table(new_glyf)?;
    builder.add_table(new_loca)?;
    builder.add_table(&outlines.hmtx)?;
    if let Ok(head) = font.head() {
        builder.add_table(&metrics::build_new_head(&head, &outlines.bounds, *loca_format))?;
    }
    builder.add_table(&metrics::build_new_hhea(
        &hhea,
        &outlines.bounds,
        mvar.as_ref(),
        &default_coords,
    ))?;
    if let Ok(os2) = font.os2() {
        builder.add_table(&metrics::build_new_os2(
            &os2,
            mvar.as_ref(),
            &default_coords,
            &relocated,
        ))?;
    }
    if let Ok(post) = font.post() {
        builder.add_table(&metrics::build_new_post(&post, mvar.as_ref(), &default_coords))?;
    }

    builder.add_table(&build_fvar(&fvar, &work)?)?;
    let gvar = Gvar::new(variations, kept_axis_count as u16).map_err(Error::GvarBuild)?;
    builder.add_table(&gvar)?;

    let new_maps: Vec<SegmentMap> = work
        .iter()
        .filter(|w| w.is_kept())
        .map(AxisWork::new_map)
        .collect();
    if new_maps.iter().any(|map| !map.is_identity()) {
        let avar = Avar {
            axis_segment_maps: new_maps.iter().map(SegmentMap::to_write).collect(),
            ..Default::default()
        };
        builder.add_table(&avar)?;
    }

    let mut rebuilt_layout: Vec<Tag> = Vec::new();
    if axes_removed {
        if let Ok(gsub) = font.gsub()
            && gsub.feature_variations().is_some()
        {
            warn!("dropping GSUB FeatureVariations: they reference removed axes");
            let mut gsub: Gsub = gsub.to_owned_table();
            gsub.feature_variations = None.into();
            builder.add_table(&gsub)?;
            rebuilt_layout.push(Tag::new(b"GSUB"));
        }
        if let Ok(gpos) = font.gpos()
            && gpos.feature_variations().is_some()
        {
            warn!("dropping GPOS FeatureVariations: they reference removed axes");
            let mut gpos: Gpos = gpos.to_owned_table();
            gpos.feature_variations = None.into();
            builder.add_table(&gpos)?;
            rebuilt_layout.push(Tag::new(b"GPOS"));
        }
    }

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if DROPPED_TABLES.contains(&tag) {
            warn!("dropping {tag}: not supported when keeping axes variable");
            continue;
        }
        if !REPLACED_TABLES.contains(&tag)
            && !REMOVED_TABLES.contains(&tag)
            && !REBUILT_TABLES.contains(&tag)
            && !rebuilt_layout.contains(&tag)
            && let Some(data) = font.table_data(tag)
        {
            builder.add_raw(tag, data);
        }
    }

    Ok(builder.build())
}

/// Rebase every tuple of one glyph.
///
/// Tuples that no longer depend on any remaining axis are applied to
/// `glyph`; the rest are returned with their dense, scaled deltas.
fn limit_glyph_tuples(
    gvar: &ReadGvar,
    gid: GlyphId,
    glyph: &mut VarGlyph,
    changes: &[AxisChange],
    axis_count: usize,
) -> Vec<(Region, Vec<Vec2>)> {
    let Ok(Some(var_data)) = gvar.glyph_variation_data(gid) else {
        return Vec::new();
    };

    let base = glyph.points.clone();
    let mut folded = vec![Vec2::ZERO; base.len()];
    let mut kept = Vec::new();

    for tuple in var_data.tuples() {
        let peak = tuple.peak();
        let start = tuple.intermediate_start();
        let end = tuple.intermediate_end();
        let tents = (0..axis_count)
            .map(|i| {
                let peak = peak.get(i).map_or(0.0, |v| f64::from(v.to_f32()));
                match (&start, &end) {
                    (Some(start), Some(end)) => Tent {
                        start: start.get(i).map_or(0.0, |v| f64::from(v.to_f32())),
                        peak,
                        end: end.get(i).map_or(0.0, |v| f64::from(v.to_f32())),
                    },
                    _ => Tent::implied(peak),
                }
            })
            .collect();
        let limited = Region(tents).limit(changes);
        if limited.is_empty() {
            continue;
        }

        let deltas = glyph.tuple_deltas(tuple.deltas(), tuple.has_deltas_for_all_points(), &base);
        for (region, factor) in limited {
            if region.is_default() {
                for (sum, delta) in folded.iter_mut().zip(&deltas) {
                    *sum += *delta * factor;
                }
            } else {
                kept.push((region, deltas.iter().map(|d| *d * factor).collect()));
            }
        }
    }

    glyph.apply(&folded, 1.0);
    kept
}

/// Merge tuples with identical regions and drop those that round to nothing.
fn optimize_tuples(tuples: Vec<(Region, Vec<Vec2>)>) -> Vec<(Region, Vec<Vec2>)> {
    let mut merged: Vec<(Region, Vec<Vec2>)> = Vec::with_capacity(tuples.len());
    let mut index: HashMap<Vec<(i16, i16, i16)>, usize> = HashMap::new();

    for (region, deltas) in tuples {
        match index.get(&region.key()) {
            Some(&i) => {
                for (sum, delta) in merged[i].1.iter_mut().zip(&deltas) {
                    *sum += *delta;
                }
            }
            None => {
                index.insert(region.key(), merged.len());
                merged.push((region, deltas));
            }
        }
    }

    merged.retain(|(_, deltas)| {
        deltas
            .iter()
            .any(|d| d.x.round() as i32 != 0 || d.y.round() as i32 != 0)
    });
    merged
}

fn build_fvar(fvar: &Fvar, work: &[AxisWork]) -> Result<WriteFvar> {
    let source_axes = fvar.axes()?;
    let axes: Vec<VariationAxisRecord> = source_axes
        .iter()
        .zip(work)
        .filter(|(_, w)| w.is_kept())
        .map(|(axis, w)| {
            let (min, default, max) = w.new_axis();
            VariationAxisRecord {
                axis_tag: axis.axis_tag(),
                min_value: Fixed::from_f64(min),
                default_value: Fixed::from_f64(default),
                max_value: Fixed::from_f64(max),
                flags: axis.flags(),
                axis_name_id: axis.axis_name_id(),
            }
        })
        .collect();

    let mut instances = Vec::new();
    for instance in fvar.instances()?.iter() {
        let instance = instance?;
        let coords: Vec<f64> = instance.coordinates.iter().map(|c| c.get().to_f64()).collect();
        if !coords.iter().zip(work).all(|(value, w)| w.accepts(*value)) {
            debug!("dropping named instance {}", instance.subfamily_name_id);
            continue;
        }
        instances.push(InstanceRecord {
            subfamily_name_id: instance.subfamily_name_id,
            flags: instance.flags,
            coordinates: coords
                .iter()
                .zip(work)
                .filter(|(_, w)| w.is_kept())
                .map(|(value, _)| Fixed::from_f64(*value))
                .collect(),
            post_script_name_id: instance.post_script_name_id,
        });
    }

    Ok(WriteFvar {
        axis_instance_arrays: AxisInstanceArrays { axes, instances }.into(),
    })
}
