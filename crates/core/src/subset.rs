//! Subsetting through [`fonthandle_subsetter`].

use fonthandle_subsetter::{Subsetter, parse_unicodes};
use log::info;

use crate::{
    error::{Error, Result},
    handle::FontHandle,
};

/// Options for [`FontHandle::subset`].
#[derive(Debug, Clone, Default)]
pub struct SubsetOptions {
    /// Layout features to keep, `None` for HarfBuzz's default set.
    pub layout_features: Option<Vec<String>>,
    pub drop_tables: Vec<String>,
    pub retain_glyph_names: bool,
    pub keep_all_name_ids: bool,
    pub no_hinting: bool,
}

impl SubsetOptions {
    pub fn with_layout_features<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.layout_features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_drop_tables<S: Into<String>>(mut self, tables: impl IntoIterator<Item = S>) -> Self {
        self.drop_tables.extend(tables.into_iter().map(Into::into));
        self
    }

    pub fn with_retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    pub fn with_keep_all_name_ids(mut self, keep: bool) -> Self {
        self.keep_all_name_ids = keep;
        self
    }

    pub fn with_no_hinting(mut self, no_hinting: bool) -> Self {
        self.no_hinting = no_hinting;
        self
    }
}

/// A 1 to 4 character tag, padded with spaces.
fn tag_bytes(tag: &str) -> Result<[u8; 4]> {
    let bytes = tag.as_bytes();
    if bytes.is_empty() || bytes.len() > 4 || !tag.is_ascii() {
        return Err(Error::Argument(format!("invalid tag {tag:?}")));
    }
    let mut out = [b' '; 4];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

impl FontHandle {
    /// Keep only the given characters and glyphs.
    ///
    /// `unicodes` is a list of code points and ranges such as
    /// `"U+0041-U+005A, 0x61, u2013"`. `glyphs` are glyph names.
    ///
    /// # Errors
    ///
    /// `Error::Argument` if all three inputs are empty, or a code point or
    /// tag cannot be parsed.
    pub fn subset(
        &mut self,
        unicodes: Option<&str>,
        glyphs: Option<&[&str]>,
        text: Option<&str>,
        options: &SubsetOptions,
    ) -> Result<()> {
        let unicodes = unicodes.map(str::trim).filter(|u| !u.is_empty());
        let glyphs = glyphs.filter(|g| !g.is_empty());
        let text = text.filter(|t| !t.is_empty());
        if unicodes.is_none() && glyphs.is_none() && text.is_none() {
            return Err(Error::Argument(
                "subsetting requires unicodes, glyphs or text".into(),
            ));
        }

        let mut subsetter = Subsetter::new()
            .retain_glyph_names(options.retain_glyph_names)
            .keep_all_name_ids(options.keep_all_name_ids)
            .no_hinting(options.no_hinting);
        if let Some(unicodes) = unicodes {
            let code_points =
                parse_unicodes(unicodes).map_err(|err| Error::Argument(err.to_string()))?;
            subsetter = subsetter.with_unicodes(code_points);
        }
        if let Some(glyphs) = glyphs {
            subsetter = subsetter.with_glyph_names(glyphs.iter().copied());
        }
        if let Some(text) = text {
            subsetter = subsetter.with_text(text);
        }
        if let Some(features) = &options.layout_features {
            let tags = features.iter().map(|f| tag_bytes(f)).collect::<Result<Vec<_>>>()?;
            subsetter = subsetter.with_layout_features(tags);
        }
        let drop = options.drop_tables.iter().map(|t| tag_bytes(t)).collect::<Result<Vec<_>>>()?;
        subsetter = subsetter.drop_tables(drop);

        let before = self.get_glyphs_count()?;
        let data = subsetter.subset(self.data()?)?;
        self.replace_data(data)?;
        info!("subset {self} from {before} to {} glyphs", self.get_glyphs_count()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_padded() {
        assert_eq!(tag_bytes("kern").unwrap(), *b"kern");
        assert_eq!(tag_bytes("cv").unwrap(), *b"cv  ");
        assert!(tag_bytes("toolong").is_err());
        assert!(tag_bytes("").is_err());
    }

    #[test]
    fn requires_some_input() {
        let mut font = FontHandle::from_bytes(font_test_data::VAZIRMATN_VAR).unwrap();
        let err = font.subset(None, Some(&[]), Some(""), &SubsetOptions::default()).unwrap_err();
        assert!(err.is_argument());
        let err = font.subset(Some("  "), None, None, &SubsetOptions::default()).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn bad_unicodes_are_argument_errors() {
        let mut font = FontHandle::from_bytes(font_test_data::VAZIRMATN_VAR).unwrap();
        let err = font.subset(Some("U+ZZZZ"), None, None, &SubsetOptions::default()).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn subset_by_text() {
        let mut font = FontHandle::from_bytes(font_test_data::VAZIRMATN_VAR).unwrap();
        let before = font.get_glyphs_count().unwrap();
        font.subset(None, None, Some("ab"), &SubsetOptions::default()).unwrap();
        assert!(font.get_glyphs_count().unwrap() < before);
    }
}
