//! Name table identifiers and their human readable keys.

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

pub const COPYRIGHT_NOTICE: u16 = 0;
pub const FAMILY_NAME: u16 = 1;
pub const SUBFAMILY_NAME: u16 = 2;
pub const UNIQUE_IDENTIFIER: u16 = 3;
pub const FULL_NAME: u16 = 4;
pub const VERSION: u16 = 5;
pub const POSTSCRIPT_NAME: u16 = 6;
pub const TYPOGRAPHIC_FAMILY_NAME: u16 = 16;
pub const TYPOGRAPHIC_SUBFAMILY_NAME: u16 = 17;
pub const WWS_FAMILY_NAME: u16 = 21;
pub const WWS_SUBFAMILY_NAME: u16 = 22;

/// The predefined name ids, indexed by id.
pub static NAMES: [(u16, &str); 26] = [
    (0, "copyright_notice"),
    (1, "family_name"),
    (2, "subfamily_name"),
    (3, "unique_identifier"),
    (4, "full_name"),
    (5, "version"),
    (6, "postscript_name"),
    (7, "trademark"),
    (8, "manufacturer_name"),
    (9, "designer"),
    (10, "description"),
    (11, "vendor_url"),
    (12, "designer_url"),
    (13, "license_description"),
    (14, "license_info_url"),
    (15, "reserved"),
    (16, "typographic_family_name"),
    (17, "typographic_subfamily_name"),
    (18, "compatible_full"),
    (19, "sample_text"),
    (20, "postscript_cid_findfont_name"),
    (21, "wws_family_name"),
    (22, "wws_subfamily_name"),
    (23, "light_background_palette"),
    (24, "dark_background_palette"),
    (25, "variations_postscript_name_prefix"),
];

/// A name record selector: a raw id or one of the keys in [`NAMES`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameKey {
    Id(u16),
    Key(String),
}

impl NameKey {
    /// The numeric name id.
    ///
    /// Ids are passed through without range checks.
    pub fn resolve(&self) -> Result<u16> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Key(key) => NAMES
                .iter()
                .find(|(_, name)| *name == key.as_str())
                .map(|(id, _)| *id)
                .ok_or_else(|| Error::UnknownNameKey(key.clone())),
        }
    }
}

/// Resolve a [`NameKey`] to its numeric id.
pub fn resolve_name_id(key: impl Into<NameKey>) -> Result<u16> {
    key.into().resolve()
}

/// The key for a predefined name id.
pub fn name_key(id: u16) -> Option<&'static str> {
    NAMES.get(usize::from(id)).map(|(_, key)| *key)
}

impl From<u16> for NameKey {
    fn from(id: u16) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for NameKey {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for NameKey {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl FromStr for NameKey {
    type Err = Error;

    /// Parse a command line value: a number, or a known key.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u16>() {
            return Ok(Self::Id(id));
        }
        if NAMES.iter().any(|(_, key)| *key == s) {
            return Ok(Self::Key(s.to_string()));
        }
        Err(Error::Argument(format!(
            "expected a name id or key such as 'family_name', found {s:?}"
        )))
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}
