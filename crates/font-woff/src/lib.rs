//! Font container detection and web font conversion.
//!
//! Fonts are edited as plain sfnt data. [`to_sfnt`] unwraps WOFF and WOFF2
//! input and reports which container it came in, [`encode`] wraps sfnt
//! data back up.
//!
//! # Example
//!
//! ```no_run
//! use fonthandle_woff::{Flavor, encode, to_sfnt};
//!
//! let data = std::fs::read("font.woff2").unwrap();
//! let (sfnt, flavor) = to_sfnt(&data).unwrap();
//! assert_eq!(flavor, Some(Flavor::Woff2));
//! let woff = encode(&sfnt, Some(Flavor::Woff)).unwrap();
//! # let _ = woff;
//! ```

mod error;
mod woff;

use std::{fmt, str::FromStr};

pub use error::{Error, Result};
use log::debug;
use read_fonts::{
    FontRef,
    types::{CFF_SFNT_VERSION, TT_SFNT_VERSION, Tag},
};

const WOFF2_SIGNATURE: u32 = 0x774F_4632;
const TRUE_SIGNATURE: u32 = 0x7472_7565;

/// File format of a font binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFormat {
    Otf,
    Ttf,
    Woff,
    Woff2,
}

impl FontFormat {
    /// Detect the format from the first four bytes.
    ///
    /// Collections and unknown signatures return `None`.
    pub fn detect(data: &[u8]) -> Option<Self> {
        let signature = u32::from_be_bytes(data.get(..4)?.try_into().ok()?);
        match signature {
            woff::SIGNATURE => Some(Self::Woff),
            WOFF2_SIGNATURE => Some(Self::Woff2),
            CFF_SFNT_VERSION => Some(Self::Otf),
            TT_SFNT_VERSION | TRUE_SIGNATURE => Some(Self::Ttf),
            _ => None,
        }
    }

    /// Format of plain sfnt data, judged by its outline tables.
    ///
    /// Unlike [`FontFormat::detect`] this does not trust the sfnt version.
    pub fn of_sfnt(font: &FontRef) -> Self {
        let has_cff = [Tag::new(b"CFF "), Tag::new(b"CFF2")]
            .into_iter()
            .any(|tag| font.table_data(tag).is_some());
        if has_cff { Self::Otf } else { Self::Ttf }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Otf => "otf",
            Self::Ttf => "ttf",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
        }
    }

    pub fn flavor(self) -> Option<Flavor> {
        match self {
            Self::Woff => Some(Flavor::Woff),
            Self::Woff2 => Some(Flavor::Woff2),
            Self::Otf | Self::Ttf => None,
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Web font container applied when saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Woff,
    Woff2,
}

impl Flavor {
    pub fn format(self) -> FontFormat {
        match self {
            Self::Woff => FontFormat::Woff,
            Self::Woff2 => FontFormat::Woff2,
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format().extension())
    }
}

impl FromStr for Flavor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "woff" => Ok(Self::Woff),
            "woff2" => Ok(Self::Woff2),
            _ => Err(Error::UnknownFormat),
        }
    }
}

/// Unwrap a font binary into sfnt data.
///
/// Returns the container flavor the data came in, `None` for plain
/// TrueType or OpenType input.
pub fn to_sfnt(data: &[u8]) -> Result<(Vec<u8>, Option<Flavor>)> {
    let format = FontFormat::detect(data).ok_or(Error::UnknownFormat)?;
    debug!("detected {format} data");
    let sfnt = match format {
        FontFormat::Woff => woff::decode(data)?,
        FontFormat::Woff2 => woofwoof::decompress(data).ok_or(Error::Woff2Decode)?,
        FontFormat::Otf | FontFormat::Ttf => data.to_vec(),
    };
    Ok((sfnt, format.flavor()))
}

/// Wrap sfnt data in the given container, or copy it when `flavor` is `None`.
pub fn encode(sfnt: &[u8], flavor: Option<Flavor>) -> Result<Vec<u8>> {
    match flavor {
        None => Ok(sfnt.to_vec()),
        Some(Flavor::Woff) => woff::encode(sfnt),
        // maximum brotli quality, no metadata, glyf/loca transforms allowed
        Some(Flavor::Woff2) => woofwoof::compress(sfnt, "", 11, true).ok_or(Error::Woff2Encode),
    }
}

#[cfg(test)]
mod tests {
    use read_fonts::TableProvider;

    use super::*;

    #[test]
    fn detect_signatures() {
        assert_eq!(FontFormat::detect(b"wOFF...."), Some(FontFormat::Woff));
        assert_eq!(FontFormat::detect(b"wOF2...."), Some(FontFormat::Woff2));
        assert_eq!(FontFormat::detect(b"OTTO...."), Some(FontFormat::Otf));
        assert_eq!(FontFormat::detect(&[0, 1, 0, 0, 0]), Some(FontFormat::Ttf));
        assert_eq!(FontFormat::detect(b"true"), Some(FontFormat::Ttf));
        assert_eq!(FontFormat::detect(b"ttcf...."), None);
        assert_eq!(FontFormat::detect(b"wO"), None);
    }

    #[test]
    fn sfnt_format_from_tables() {
        let ttf = FontRef::new(font_test_data::SIMPLE_GLYF).unwrap();
        assert_eq!(FontFormat::of_sfnt(&ttf), FontFormat::Ttf);
        let otf = FontRef::new(font_test_data::CANTARELL_VF_TRIMMED).unwrap();
        assert_eq!(FontFormat::of_sfnt(&otf), FontFormat::Otf);
    }

    #[test]
    fn flavor_parsing() {
        assert_eq!("WOFF2".parse::<Flavor>().unwrap(), Flavor::Woff2);
        assert_eq!(" woff ".parse::<Flavor>().unwrap(), Flavor::Woff);
        assert!("ttf".parse::<Flavor>().is_err());
        assert_eq!(Flavor::Woff2.to_string(), "woff2");
    }

    #[test]
    fn plain_sfnt_passes_through() {
        let data = font_test_data::SIMPLE_GLYF;
        let (sfnt, flavor) = to_sfnt(data).unwrap();
        assert_eq!(sfnt, data);
        assert_eq!(flavor, None);
        assert_eq!(encode(data, None).unwrap(), data);
    }

    #[test]
    fn woff_container() {
        let data = font_test_data::SIMPLE_GLYF;
        let woff = encode(data, Some(Flavor::Woff)).unwrap();
        assert_eq!(FontFormat::detect(&woff), Some(FontFormat::Woff));

        let (sfnt, flavor) = to_sfnt(&woff).unwrap();
        assert_eq!(flavor, Some(Flavor::Woff));
        assert_eq!(FontFormat::detect(&sfnt), Some(FontFormat::Ttf));
    }

    #[test]
    fn woff2_container() {
        let data = font_test_data::VAZIRMATN_VAR;
        let woff2 = encode(data, Some(Flavor::Woff2)).unwrap();
        assert_eq!(FontFormat::detect(&woff2), Some(FontFormat::Woff2));

        let (sfnt, flavor) = to_sfnt(&woff2).unwrap();
        assert_eq!(flavor, Some(Flavor::Woff2));
        let original = FontRef::new(data).unwrap();
        let decoded = FontRef::new(&sfnt).unwrap();
        assert_eq!(decoded.maxp().unwrap().num_glyphs(), original.maxp().unwrap().num_glyphs());
    }

    #[test]
    fn unknown_data_is_rejected() {
        assert!(matches!(to_sfnt(b"not a font"), Err(Error::UnknownFormat)));
    }
}
