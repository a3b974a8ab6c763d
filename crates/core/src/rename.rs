//! Family and style renaming.

use std::{collections::BTreeMap, sync::LazyLock};

use log::info;
use regex::Regex;

use crate::{
    error::{Error, Result},
    handle::FontHandle,
    names::{
        FAMILY_NAME, FULL_NAME, POSTSCRIPT_NAME, SUBFAMILY_NAME, TYPOGRAPHIC_FAMILY_NAME,
        TYPOGRAPHIC_SUBFAMILY_NAME, UNIQUE_IDENTIFIER, WWS_FAMILY_NAME, WWS_SUBFAMILY_NAME,
    },
    style::StyleFlags,
};

const POSTSCRIPT_NAME_MAX_LEN: usize = 63;

static POSTSCRIPT_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"[^A-Za-z0-9!"#$&'*+,\-.:;=?@\\^_`|~]"##).unwrap());
static DASH_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

const RIBBI_STYLES: [&str; 4] = ["regular", "italic", "bold", "bold italic"];

/// `"{family} {style}"`, without repeating a style the family already ends with.
pub fn full_name(family: &str, style: &str) -> String {
    if style.is_empty() || family.ends_with(&format!(" {style}")) {
        family.to_string()
    } else if family.is_empty() {
        style.to_string()
    } else {
        format!("{family} {style}")
    }
}

/// PostScript name for a family and style, restricted to the printable
/// ASCII subset the format allows.
pub fn postscript_name(family: &str, style: &str) -> String {
    let raw = format!("{}-{}", family.replace(' ', ""), style.replace(' ', ""));
    let filtered = POSTSCRIPT_DISALLOWED.replace_all(&raw, "");
    DASH_RUNS
        .replace_all(&filtered, "-")
        .trim_matches('-')
        .to_string()
}

fn is_ribbi(style: &str) -> bool {
    RIBBI_STYLES.contains(&style.to_lowercase().as_str())
}

impl FontHandle {
    fn first_name(&self, ids: [u16; 3]) -> Result<String> {
        for id in ids {
            if let Some(name) = self.get_name(id)?.filter(|name| !name.trim().is_empty()) {
                return Ok(name);
            }
        }
        Ok(String::new())
    }

    /// Rename family and/or style, keeping every related name record
    /// consistent.
    ///
    /// Blank arguments keep the current family or style. With
    /// `update_style_flags` a RIBBI style name also updates the style flags.
    ///
    /// # Errors
    ///
    /// `Error::Argument` if the resulting PostScript name is longer than 63
    /// characters. The font is left unchanged in that case.
    pub fn rename(
        &mut self,
        family_name: Option<&str>,
        style_name: Option<&str>,
        update_style_flags: bool,
    ) -> Result<()> {
        let family = match family_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self.first_name([TYPOGRAPHIC_FAMILY_NAME, WWS_FAMILY_NAME, FAMILY_NAME])?,
        };
        let style = match style_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self.first_name([
                TYPOGRAPHIC_SUBFAMILY_NAME,
                WWS_SUBFAMILY_NAME,
                SUBFAMILY_NAME,
            ])?,
        };

        let full = full_name(&family, &style);
        let postscript = postscript_name(&family, &style);
        if postscript.len() > POSTSCRIPT_NAME_MAX_LEN {
            return Err(Error::Argument(format!(
                "PostScript name {postscript:?} exceeds {POSTSCRIPT_NAME_MAX_LEN} characters"
            )));
        }

        let old_postscript = self.get_name(POSTSCRIPT_NAME)?.unwrap_or_default();
        let unique_id = match self.get_name(UNIQUE_IDENTIFIER)? {
            Some(uid) if !old_postscript.is_empty() => uid.replace(&old_postscript, &postscript),
            Some(uid) => uid,
            None => postscript.clone(),
        };

        let (legacy_family, legacy_style) = if is_ribbi(&style) {
            (family.clone(), style.clone())
        } else if style.to_lowercase().contains("italic") {
            (full.clone(), "Italic".to_string())
        } else {
            (full.clone(), "Regular".to_string())
        };

        let updates = BTreeMap::from([
            (FAMILY_NAME, Some(legacy_family)),
            (SUBFAMILY_NAME, Some(legacy_style)),
            (UNIQUE_IDENTIFIER, Some(unique_id)),
            (FULL_NAME, Some(full.clone())),
            (POSTSCRIPT_NAME, Some(postscript.clone())),
            (TYPOGRAPHIC_FAMILY_NAME, Some(family.clone())),
            (TYPOGRAPHIC_SUBFAMILY_NAME, Some(style.clone())),
            (WWS_FAMILY_NAME, Some(family)),
            (WWS_SUBFAMILY_NAME, Some(style.clone())),
        ]);
        self.update_names(updates)?;
        info!("renamed {self} to {full:?} ({postscript})");

        if update_style_flags && let Some(flags) = StyleFlags::from_subfamily_name(&style) {
            self.set_style_flags(flags)?;
        }
        Ok(())
    }

    pub fn set_family_name(&mut self, name: &str) -> Result<()> {
        self.rename(Some(name), None, true)
    }

    pub fn set_style_name(&mut self, name: &str) -> Result<()> {
        self.rename(None, Some(name), true)
    }
}
