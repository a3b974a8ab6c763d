//! Full instancing: every axis pinned, the result is a static font.

use log::debug;
use read_fonts::{
    FontRef, TableProvider,
    tables::{fvar::Fvar, glyf::Glyf, gvar::Gvar, hmtx::Hmtx, loca::Loca},
    types::{F2Dot14, Fixed, GlyphId, Tag},
};
use write_fonts::{
    FontBuilder,
    tables::{
        glyf::Glyph,
        stat::{AxisRecord, AxisValue, AxisValueTableFlags, Stat},
    },
    types::NameId,
};

use crate::{
    error::{Error, Result},
    location::PinnedAxis,
    metrics,
    outline::{self, VarGlyph},
};

/// Tables that only make sense in a variable font.
const VARIATION_TABLES: [Tag; 8] = [
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"avar"),
    Tag::new(b"cvar"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
    Tag::new(b"STAT"),
];

pub(crate) const REPLACED_TABLES: [Tag; 7] = [
    Tag::new(b"glyf"),
    Tag::new(b"loca"),
    Tag::new(b"hmtx"),
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"OS/2"),
    Tag::new(b"post"),
];

/// Signatures no longer match once outlines change.
pub(crate) const REMOVED_TABLES: [Tag; 1] = [Tag::new(b"DSIG")];

/// Outlines and horizontal metrics at one location.
struct Instanced {
    glyphs: Vec<Glyph>,
    advances: Vec<u16>,
    lsbs: Vec<i16>,
}

/// Apply the gvar deltas active at `coords` to every glyph.
fn instance_glyphs(
    glyf: &Glyf,
    loca: &Loca,
    gvar: &Gvar,
    hmtx: &Hmtx,
    num_glyphs: u32,
    coords: &[F2Dot14],
) -> Result<Instanced> {
    let capacity = num_glyphs as usize;
    let mut out = Instanced {
        glyphs: Vec::with_capacity(capacity),
        advances: Vec::with_capacity(capacity),
        lsbs: Vec::with_capacity(capacity),
    };

    for gid in (0..num_glyphs).map(GlyphId::new) {
        let mut glyph = VarGlyph::read(loca, glyf, gid)?;
        let default_points = glyph.points.clone();

        if let Ok(Some(variations)) = gvar.glyph_variation_data(gid) {
            for (tuple, scalar) in variations.active_tuples_at(coords) {
                let deltas = glyph.tuple_deltas(
                    tuple.deltas(),
                    tuple.has_deltas_for_all_points(),
                    &default_points,
                );
                glyph.apply(&deltas, scalar.to_f64());
            }
        }

        // The horizontal phantom points carry the advance.
        let advance = f64::from(hmtx.advance(gid).unwrap_or(0)) + glyph.advance_delta();
        out.advances.push(advance.round().clamp(0.0, f64::from(u16::MAX)) as u16);
        out.lsbs.push(hmtx.side_bearing(gid).unwrap_or(0));
        out.glyphs.push(glyph.to_glyph());
    }
    Ok(out)
}

/// Instance a variable font with every fvar axis in `pinned`.
///
/// Outlines and advances get the gvar deltas of the location, head, hhea,
/// OS/2 and post are recomputed with MVAR applied, and the variation tables
/// are dropped. STAT is replaced by one describing the pinned location.
pub(crate) fn pin_all(font: &FontRef, pinned: &[PinnedAxis]) -> Result<Vec<u8>> {
    let fvar = font.fvar().map_err(|_| Error::NotVariableFont)?;
    let glyf = font.glyf().map_err(|_| Error::NoCff2Support)?;
    let loca = font.loca(None).map_err(|_| Error::NoCff2Support)?;
    let gvar = font.gvar().map_err(|_| Error::NoGvar)?;

    let avar = font.avar().ok();
    let user_coords: Vec<(Tag, Fixed)> =
        pinned.iter().map(|axis| (axis.tag, Fixed::from_f64(axis.value))).collect();
    let mut coords = vec![F2Dot14::default(); fvar.axis_count() as usize];
    fvar.user_to_normalized(avar.as_ref(), user_coords, &mut coords);
    debug!("pinning at normalized {coords:?}");

    let hmtx = font.hmtx()?;
    let hhea = font.hhea()?;
    let num_glyphs = u32::from(font.maxp()?.num_glyphs());
    let instanced = instance_glyphs(&glyf, &loca, &gvar, &hmtx, num_glyphs, &coords)?;

    let outlines = outline::assemble(
        instanced.glyphs,
        &instanced.advances,
        &instanced.lsbs,
        usize::from(hhea.number_of_h_metrics()),
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
        &coords,
    ))?;
    if let Ok(os2) = font.os2() {
        builder.add_table(&metrics::build_new_os2(&os2, mvar.as_ref(), &coords, pinned))?;
    }
    if let Ok(post) = font.post() {
        builder.add_table(&metrics::build_new_post(&post, mvar.as_ref(), &coords))?;
    }
    builder.add_table(&pinned_stat(&fvar, pinned)?)?;

    let skipped = |tag: &Tag| {
        VARIATION_TABLES.contains(tag) || REPLACED_TABLES.contains(tag) || REMOVED_TABLES.contains(tag)
    };
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if !skipped(&tag)
            && let Some(data) = font.table_data(tag)
        {
            builder.add_raw(tag, data);
        }
    }

    Ok(builder.build())
}

/// A STAT with one format 1 value per pinned axis, elidable at the default.
fn pinned_stat(fvar: &Fvar, pinned: &[PinnedAxis]) -> Result<Stat> {
    let axes = fvar.axes()?;

    let design_axes = axes
        .iter()
        .enumerate()
        .map(|(ordering, axis)| AxisRecord::new(axis.axis_tag(), axis.axis_name_id(), ordering as u16))
        .collect();

    let values = pinned
        .iter()
        .filter_map(|pin| {
            let (index, axis) = axes.iter().enumerate().find(|(_, a)| a.axis_tag() == pin.tag)?;
            let flags = if (pin.value - axis.default_value().to_f64()).abs() < 1e-6 {
                AxisValueTableFlags::ELIDABLE_AXIS_VALUE_NAME
            } else {
                AxisValueTableFlags::empty()
            };
            Some(AxisValue::format_1(
                index as u16,
                flags,
                axis.axis_name_id(),
                Fixed::from_f64(pin.value),
            ))
        })
        .collect();

    Ok(Stat::new(design_axes, values, NameId::new(2)))
}
