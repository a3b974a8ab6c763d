//! Overlap flags on glyf outlines.
//!
//! Glyphs are patched in place: OVERLAP_SIMPLE on the first flag byte of a
//! simple glyph, OVERLAP_COMPOUND on the first component of a composite.

use read_fonts::{FontRef, TableProvider, types::Tag};

use crate::error::Result;

const OVERLAP_SIMPLE: u8 = 0x40;
/// High byte of the 0x0400 component flag.
const OVERLAP_COMPOUND_HIGH: u8 = 0x04;
const GLYPH_HEADER_LEN: usize = 10;

/// Set overlap flags on every non-empty glyph.
pub(crate) fn set_overlap_flags(data: &[u8]) -> Result<Vec<u8>> {
    update_overlap_flags(data, true)
}

/// Clear overlap flags on every glyph.
pub(crate) fn clear_overlap_flags(data: &[u8]) -> Result<Vec<u8>> {
    update_overlap_flags(data, false)
}

fn update_overlap_flags(data: &[u8], set: bool) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let loca = font.loca(None)?;
    let glyf_tag = Tag::new(b"glyf");
    let Some(glyf) = font.table_data(glyf_tag) else {
        return Ok(data.to_vec());
    };

    let mut glyf = glyf.as_bytes().to_vec();
    for gid in 0..loca.len() {
        let (Some(start), Some(end)) = (loca.get_raw(gid), loca.get_raw(gid + 1)) else {
            continue;
        };
        flag_glyph(&mut glyf, start as usize, end as usize, set);
    }

    fonthandle_font_ops::rewrite_font(data, |_, builder| {
        builder.add_raw(glyf_tag, glyf);
        Ok::<_, crate::Error>(())
    })
}

fn flag_glyph(glyf: &mut [u8], start: usize, end: usize, set: bool) {
    let update = |byte: &mut u8, bit: u8| {
        if set {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    };
    if end <= start || end > glyf.len() || end - start < GLYPH_HEADER_LEN + 2 {
        return;
    }
    let contours = i16::from_be_bytes([glyf[start], glyf[start + 1]]);

    if contours > 0 {
        let end_pts_len = 2 * contours as usize;
        let instruction_len_at = start + GLYPH_HEADER_LEN + end_pts_len;
        if instruction_len_at + 2 > end {
            return;
        }
        let instruction_len =
            u16::from_be_bytes([glyf[instruction_len_at], glyf[instruction_len_at + 1]]) as usize;
        let first_flag = instruction_len_at + 2 + instruction_len;
        if first_flag < end {
            update(&mut glyf[first_flag], OVERLAP_SIMPLE);
        }
    } else if contours < 0 {
        update(&mut glyf[start + GLYPH_HEADER_LEN], OVERLAP_COMPOUND_HIGH);
    }
}
