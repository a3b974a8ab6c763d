//! Characters, glyphs and layout features.

use std::collections::BTreeSet;

use read_fonts::{TableProvider, types::GlyphId16};
use skrifa::MetadataProvider;

use crate::{
    error::{Error, Result},
    handle::FontHandle,
};

/// A mapped character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub character: char,
    pub code: u32,
    pub glyph_id: u32,
    /// From `post`, when the font names its glyphs.
    pub glyph_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub id: u32,
    pub name: Option<String>,
}

impl FontHandle {
    /// Feature tags from GSUB and GPOS, sorted and deduplicated.
    pub fn get_features_tags(&self) -> Result<Vec<String>> {
        let font = self.font()?;
        let mut tags = BTreeSet::new();
        if let Ok(gsub) = font.gsub() {
            let features = gsub.feature_list()?;
            tags.extend(features.feature_records().iter().map(|r| r.feature_tag().to_string()));
        }
        if let Ok(gpos) = font.gpos() {
            let features = gpos.feature_list()?;
            tags.extend(features.feature_records().iter().map(|r| r.feature_tag().to_string()));
        }
        Ok(tags.into_iter().collect())
    }

    /// Characters in the best cmap subtable, control characters skipped.
    pub fn get_characters(&self) -> Result<Vec<Character>> {
        let data = self.data()?;
        let font = skrifa::FontRef::new(data).map_err(|err| Error::Data(err.to_string()))?;
        let post = self.font()?.post().ok();

        Ok(font
            .charmap()
            .mappings()
            .filter_map(|(code, gid)| {
                let character = char::from_u32(code).filter(|c| !c.is_control())?;
                let glyph_id = gid.to_u32();
                let glyph_name = post.as_ref().and_then(|post| {
                    let gid = u16::try_from(glyph_id).ok()?;
                    post.glyph_name(GlyphId16::new(gid)).map(str::to_string)
                });
                Some(Character {
                    character,
                    code,
                    glyph_id,
                    glyph_name,
                })
            })
            .collect())
    }

    pub fn get_characters_count(&self) -> Result<usize> {
        Ok(self.get_characters()?.len())
    }

    /// Every glyph id with its post name.
    pub fn get_glyphs(&self) -> Result<Vec<Glyph>> {
        let font = self.font()?;
        let count = font.maxp()?.num_glyphs();
        let post = font.post().ok();
        Ok((0..count)
            .map(|gid| Glyph {
                id: u32::from(gid),
                name: post
                    .as_ref()
                    .and_then(|post| post.glyph_name(GlyphId16::new(gid)))
                    .map(str::to_string),
            })
            .collect())
    }

    pub fn get_glyphs_count(&self) -> Result<usize> {
        Ok(usize::from(self.font()?.maxp()?.num_glyphs()))
    }
}
