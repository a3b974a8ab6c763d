//! Font-wide metrics tables recomputed after outlines change.

use read_fonts::{
    tables::{head::Head, hhea::Hhea, mvar::Mvar, mvar::tags as mvar_tags, os2::Os2, post::Post},
    types::{F2Dot14, Tag},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::Glyph as WriteGlyph, head::Head as WriteHead, hhea::Hhea as WriteHhea,
        hmtx::Hmtx as WriteHmtx, loca::LocaFormat, os2::Os2 as WriteOs2,
        post::Post as WritePost,
    },
};

use crate::{location::PinnedAxis, outline::clamp_i16};

pub(crate) fn build_new_hmtx(advances: &[u16], lsbs: &[i16], num_h_metrics: usize) -> WriteHmtx {
    let num_glyphs = advances.len();
    let mut h_metrics = Vec::with_capacity(num_h_metrics);
    let mut left_side_bearings = Vec::with_capacity(num_glyphs.saturating_sub(num_h_metrics));

    for gid in 0..num_glyphs {
        let advance = advances[gid];
        let lsb = lsbs[gid];

        if gid < num_h_metrics {
            h_metrics.push(write_fonts::tables::hmtx::LongMetric {
                advance,
                side_bearing: lsb,
            });
        } else {
            left_side_bearings.push(lsb);
        }
    }

    WriteHmtx {
        h_metrics,
        left_side_bearings,
    }
}

/// Bounding box and metrics information calculated from glyph data.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FontBounds {
    pub x_min: i16,
    pub x_max: i16,
    pub y_min: i16,
    pub y_max: i16,
    min_left_side_bearing: i16,
    min_right_side_bearing: i16,
    x_max_extent: i16,
    advance_width_max: u16,
}

impl FontBounds {
    pub fn new() -> Self {
        FontBounds {
            x_min: i16::MAX,
            x_max: i16::MIN,
            y_min: i16::MAX,
            y_max: i16::MIN,
            min_left_side_bearing: i16::MAX,
            min_right_side_bearing: i16::MAX,
            x_max_extent: i16::MIN,
            advance_width_max: 0,
        }
    }

    pub fn update(&mut self, glyph: &WriteGlyph, advance: u16) {
        self.advance_width_max = self.advance_width_max.max(advance);

        let bbox = match glyph {
            WriteGlyph::Simple(s) => s.bbox,
            WriteGlyph::Composite(c) => c.bbox,
            WriteGlyph::Empty => return,
        };

        if bbox.x_min == 0 && bbox.x_max == 0 && bbox.y_min == 0 && bbox.y_max == 0 {
            return;
        }

        self.x_min = self.x_min.min(bbox.x_min);
        self.x_max = self.x_max.max(bbox.x_max);
        self.y_min = self.y_min.min(bbox.y_min);
        self.y_max = self.y_max.max(bbox.y_max);

        let lsb = bbox.x_min;
        self.min_left_side_bearing = self.min_left_side_bearing.min(lsb);

        // RSB = advance_width - LSB - glyph_width
        let glyph_width = bbox.x_max.saturating_sub(bbox.x_min);
        let rsb = (advance as i16)
            .saturating_sub(lsb)
            .saturating_sub(glyph_width);
        self.min_right_side_bearing = self.min_right_side_bearing.min(rsb);

        let extent = lsb.saturating_add(glyph_width);
        self.x_max_extent = self.x_max_extent.max(extent);
    }

    pub fn finalize(&mut self) {
        if self.x_min == i16::MAX {
            self.x_min = 0;
        }
        if self.x_max == i16::MIN {
            self.x_max = 0;
        }
        if self.y_min == i16::MAX {
            self.y_min = 0;
        }
        if self.y_max == i16::MIN {
            self.y_max = 0;
        }
        if self.min_left_side_bearing == i16::MAX {
            self.min_left_side_bearing = 0;
        }
        if self.min_right_side_bearing == i16::MAX {
            self.min_right_side_bearing = 0;
        }
        if self.x_max_extent == i16::MIN {
            self.x_max_extent = 0;
        }
    }
}

pub(crate) fn build_new_head(head: &Head, bounds: &FontBounds, loca_format: LocaFormat) -> WriteHead {
    WriteHead::new(
        head.font_revision(),
        head.checksum_adjustment(),
        head.flags(),
        head.units_per_em(),
        head.created(),
        head.modified(),
        bounds.x_min,
        bounds.y_min,
        bounds.x_max,
        bounds.y_max,
        head.mac_style(),
        head.lowest_rec_ppem(),
        match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    )
}

fn get_mvar_delta(mvar: Option<&Mvar>, tag: Tag, coords: &[F2Dot14]) -> i32 {
    mvar.and_then(|m| m.metric_delta(tag, coords).ok())
        .map(|f| f.to_i32())
        .unwrap_or(0)
}

fn with_delta(value: i16, mvar: Option<&Mvar>, tag: Tag, coords: &[F2Dot14]) -> i16 {
    clamp_i16(i32::from(value) + get_mvar_delta(mvar, tag, coords))
}

pub(crate) fn build_new_hhea(
    original: &Hhea,
    bounds: &FontBounds,
    mvar: Option<&Mvar>,
    coords: &[F2Dot14],
) -> WriteHhea {
    WriteHhea::new(
        with_delta(original.ascender().to_i16(), mvar, mvar_tags::HASC, coords).into(),
        with_delta(original.descender().to_i16(), mvar, mvar_tags::HDSC, coords).into(),
        with_delta(original.line_gap().to_i16(), mvar, mvar_tags::HLGP, coords).into(),
        bounds.advance_width_max.into(),
        bounds.min_left_side_bearing.into(),
        bounds.min_right_side_bearing.into(),
        bounds.x_max_extent.into(),
        with_delta(original.caret_slope_rise(), mvar, mvar_tags::HCRS, coords),
        with_delta(original.caret_slope_run(), mvar, mvar_tags::HCRN, coords),
        with_delta(original.caret_offset(), mvar, mvar_tags::HCOF, coords),
        original.number_of_h_metrics(),
    )
}

/// Convert wdth axis value (percentage, typically 50-200) to usWidthClass (1-9)
pub(crate) fn wdth_to_width_class(wdth: f64) -> u16 {
    // 1=Ultra-condensed (50%), 2=Extra-condensed (62.5%), 3=Condensed (75%),
    // 4=Semi-condensed (87.5%), 5=Medium/Normal (100%), 6=Semi-expanded (112.5%),
    // 7=Expanded (125%), 8=Extra-expanded (150%), 9=Ultra-expanded (200%)
    match wdth {
        w if w <= 56.25 => 1,
        w if w <= 68.75 => 2,
        w if w <= 81.25 => 3,
        w if w <= 93.75 => 4,
        w if w <= 106.25 => 5,
        w if w <= 118.75 => 6,
        w if w <= 137.5 => 7,
        w if w <= 175.0 => 8,
        _ => 9,
    }
}

/// OS/2 with MVAR deltas applied and weight/width classes taken from the
/// `wght`/`wdth` values in `location`, the axes that were pinned or whose
/// default moved.
pub(crate) fn build_new_os2(
    original: &Os2,
    mvar: Option<&Mvar>,
    coords: &[F2Dot14],
    location: &[PinnedAxis],
) -> WriteOs2 {
    let mut os2: WriteOs2 = original.to_owned_table();

    for axis in location {
        match &axis.tag.to_be_bytes() {
            b"wght" => os2.us_weight_class = axis.value.round().clamp(1.0, 1000.0) as u16,
            b"wdth" => os2.us_width_class = wdth_to_width_class(axis.value),
            _ => {}
        }
    }

    os2.y_strikeout_size = with_delta(original.y_strikeout_size(), mvar, mvar_tags::STRS, coords);
    os2.y_strikeout_position =
        with_delta(original.y_strikeout_position(), mvar, mvar_tags::STRO, coords);
    os2.s_typo_ascender = with_delta(original.s_typo_ascender(), mvar, mvar_tags::HASC, coords);
    os2.s_typo_descender = with_delta(original.s_typo_descender(), mvar, mvar_tags::HDSC, coords);
    os2.s_typo_line_gap = with_delta(original.s_typo_line_gap(), mvar, mvar_tags::HLGP, coords);

    os2.y_subscript_x_offset =
        with_delta(original.y_subscript_x_offset(), mvar, mvar_tags::SBXO, coords);
    os2.y_subscript_y_offset =
        with_delta(original.y_subscript_y_offset(), mvar, mvar_tags::SBYO, coords);
    os2.y_subscript_x_size =
        with_delta(original.y_subscript_x_size(), mvar, mvar_tags::SBXS, coords);
    os2.y_subscript_y_size =
        with_delta(original.y_subscript_y_size(), mvar, mvar_tags::SBYS, coords);

    os2.y_superscript_x_offset =
        with_delta(original.y_superscript_x_offset(), mvar, mvar_tags::SPXO, coords);
    os2.y_superscript_y_offset =
        with_delta(original.y_superscript_y_offset(), mvar, mvar_tags::SPYO, coords);
    os2.y_superscript_x_size =
        with_delta(original.y_superscript_x_size(), mvar, mvar_tags::SPXS, coords);
    os2.y_superscript_y_size =
        with_delta(original.y_superscript_y_size(), mvar, mvar_tags::SPYS, coords);

    if let Some(sx_height) = original.sx_height() {
        os2.sx_height = Some(with_delta(sx_height, mvar, mvar_tags::XHGT, coords));
    }
    if let Some(s_cap_height) = original.s_cap_height() {
        os2.s_cap_height = Some(with_delta(s_cap_height, mvar, mvar_tags::CPHT, coords));
    }

    os2
}

pub(crate) fn build_new_post(original: &Post, mvar: Option<&Mvar>, coords: &[F2Dot14]) -> WritePost {
    let mut post: WritePost = original.to_owned_table();

    post.underline_position = with_delta(
        original.underline_position().to_i16(),
        mvar,
        mvar_tags::UNDO,
        coords,
    )
    .into();
    post.underline_thickness = with_delta(
        original.underline_thickness().to_i16(),
        mvar,
        mvar_tags::UNDS,
        coords,
    )
    .into();

    post
}
