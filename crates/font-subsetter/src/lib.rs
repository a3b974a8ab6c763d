//! Font subsetting wrapper around hb-subset with builder pattern.
//!
//! This crate provides a high-level interface for subsetting fonts using HarfBuzz's
//! hb-subset library. It operates purely on byte slices with no file I/O dependencies.
//!
//! # Example
//!
//! ```no_run
//! use fonthandle_subsetter::{Subsetter, parse_unicodes};
//!
//! let font_data: &[u8] = &[];
//! let subset = Subsetter::new()
//!     .with_unicodes(parse_unicodes("U+0020-U+007E").unwrap())
//!     .with_text("Ünïcödé")
//!     .with_glyph_names(["ampersand.alt"])
//!     .no_hinting(true)
//!     .subset(font_data);
//! ```

mod error;
mod unicodes;

use std::collections::BTreeSet;

use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use log::{debug, info, warn};
use read_fonts::{FontRef, TableProvider, types::GlyphId16};

pub use error::{Error, Result};
pub use unicodes::parse_unicodes;

/// Variable font tables, for callers that want a static subset.
pub const VF_TABLES: &[&[u8; 4]] = &[
    b"HVAR", b"MVAR", b"VVAR", b"STAT", b"avar", b"fvar", b"gvar", b"cvar",
];

/// Font subsetter with builder pattern.
///
/// At least one of unicodes, glyphs or text must be given before calling
/// [`Subsetter::subset`]. Layout features default to HarfBuzz's own list.
#[derive(Debug, Clone, Default)]
pub struct Subsetter {
    unicodes: BTreeSet<u32>,
    glyph_ids: BTreeSet<u32>,
    glyph_names: Vec<String>,
    layout_features: Option<Vec<[u8; 4]>>,
    drop_tables: Vec<[u8; 4]>,
    retain_glyph_names: bool,
    keep_all_name_ids: bool,
    no_hinting: bool,
}

impl Subsetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds code points to keep.
    pub fn with_unicodes(mut self, unicodes: impl IntoIterator<Item = u32>) -> Self {
        self.unicodes.extend(unicodes);
        self
    }

    /// Adds inclusive code point ranges to keep.
    pub fn with_unicode_ranges(mut self, ranges: impl IntoIterator<Item = (u32, u32)>) -> Self {
        for (start, end) in ranges {
            self.unicodes.extend(start..=end);
        }
        self
    }

    /// Keeps every character of `text`.
    pub fn with_text(mut self, text: &str) -> Self {
        self.unicodes.extend(text.chars().map(u32::from));
        self
    }

    pub fn with_glyph_ids(mut self, glyph_ids: impl IntoIterator<Item = u32>) -> Self {
        self.glyph_ids.extend(glyph_ids);
        self
    }

    /// Adds glyphs by their `post` table name.
    ///
    /// Names the font does not define are skipped with a warning.
    pub fn with_glyph_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.glyph_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the layout features to retain in the subset.
    ///
    /// Replaces any previously configured layout features.
    pub fn with_layout_features(mut self, features: impl IntoIterator<Item = [u8; 4]>) -> Self {
        self.layout_features = Some(features.into_iter().collect());
        self
    }

    /// Adds tables to remove from the output.
    pub fn drop_tables(mut self, tables: impl IntoIterator<Item = [u8; 4]>) -> Self {
        self.drop_tables.extend(tables);
        self
    }

    /// Sets whether to retain glyph names in the subset.
    ///
    /// Glyph names can be useful for debugging but increase file size.
    pub fn retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    /// Keeps every name record instead of HarfBuzz's default subset of ids.
    pub fn keep_all_name_ids(mut self, keep: bool) -> Self {
        self.keep_all_name_ids = keep;
        self
    }

    /// Strips hinting instructions.
    pub fn no_hinting(mut self, no_hinting: bool) -> Self {
        self.no_hinting = no_hinting;
        self
    }

    /// True when nothing would be kept apart from `.notdef`.
    pub fn is_empty(&self) -> bool {
        self.unicodes.is_empty() && self.glyph_ids.is_empty() && self.glyph_names.is_empty()
    }

    /// Subsets the font data and returns the result.
    ///
    /// # Errors
    ///
    /// - `Error::NothingToKeep` if no unicodes, glyphs or text were given
    /// - `Error::Parse` if the font cannot be read
    /// - `Error::HarfBuzz` if hb-subset fails
    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(Error::NothingToKeep);
        }

        let font = FontRef::new(data)?;
        let mut glyph_ids = self.glyph_ids.clone();
        glyph_ids.extend(resolve_glyph_names(&font, &self.glyph_names));

        let mut input = SubsetInput::new().map_err(harfbuzz)?;

        if self.retain_glyph_names {
            input.flags().retain_glyph_names();
        }
        if self.no_hinting {
            input.flags().remove_hinting();
        }

        if let Some(features) = &self.layout_features {
            let mut feature_set = input.layout_feature_tag_set();
            feature_set.clear();
            for tag in features {
                feature_set.insert(Tag::new(tag));
            }
        }

        {
            let mut unicode_set = input.unicode_set();
            for c in self.unicodes.iter().filter_map(|cp| char::from_u32(*cp)) {
                unicode_set.insert(c);
            }
        }

        {
            let mut glyph_set = input.glyph_set();
            for gid in &glyph_ids {
                glyph_set.insert(*gid);
            }
        }

        if !self.drop_tables.is_empty() {
            let mut drop_tables = input.drop_table_tag_set();
            for table in &self.drop_tables {
                drop_tables.insert(Tag::new(table));
            }
        }

        if self.keep_all_name_ids
            && let Ok(name) = font.name()
        {
            let mut name_ids = input.name_id_set();
            for record in name.name_record() {
                name_ids.insert(u32::from(record.name_id().to_u16()));
            }
        }

        debug!(
            "subsetting {} code points and {} glyph ids",
            self.unicodes.len(),
            glyph_ids.len()
        );
        let face = FontFace::new(Blob::from_bytes(data).map_err(harfbuzz)?).map_err(harfbuzz)?;
        let subset_font = input.subset_font(&face).map_err(harfbuzz)?;
        let output = subset_font.underlying_blob().to_vec();
        info!("subset font from {} to {} bytes", data.len(), output.len());
        Ok(output)
    }
}

fn harfbuzz(err: impl std::fmt::Display) -> Error {
    Error::HarfBuzz(err.to_string())
}

/// Map `post` glyph names to glyph ids.
fn resolve_glyph_names(font: &FontRef, names: &[String]) -> Vec<u32> {
    if names.is_empty() {
        return Vec::new();
    }
    let Ok(post) = font.post() else {
        warn!("font has no post table, glyph names ignored");
        return Vec::new();
    };
    let num_glyphs = font.maxp().map(|maxp| maxp.num_glyphs()).unwrap_or(0);

    let mut gids = Vec::with_capacity(names.len());
    for name in names {
        let found = (0..num_glyphs)
            .find(|gid| post.glyph_name(GlyphId16::new(*gid).into()) == Some(name.as_str()));
        match found {
            Some(gid) => gids.push(u32::from(gid)),
            None => warn!("glyph {name:?} not found"),
        }
    }
    gids
}
