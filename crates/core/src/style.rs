//! Legacy style flags stored in `head.macStyle` and `OS/2.fsSelection`.

use std::{fmt, str::FromStr};

use log::debug;
use read_fonts::TableProvider;
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        head::{Head, MacStyle},
        os2::{Os2, SelectionFlags},
    },
};

use crate::{
    error::{Error, Result},
    flags::{get_flag, set_flag},
    handle::FontHandle,
    names::{SUBFAMILY_NAME, TYPOGRAPHIC_SUBFAMILY_NAME, WWS_SUBFAMILY_NAME},
};

/// A named style bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleFlag {
    Regular,
    Bold,
    Italic,
    Underline,
    Outline,
    Shadow,
    Condensed,
    Extended,
}

/// `(flag, name, macStyle bit, fsSelection bit)`.
static STYLE_FLAG_BITS: [(StyleFlag, &str, Option<u8>, Option<u8>); 8] = [
    (StyleFlag::Regular, "regular", None, Some(6)),
    (StyleFlag::Bold, "bold", Some(0), Some(5)),
    (StyleFlag::Italic, "italic", Some(1), Some(0)),
    (StyleFlag::Underline, "underline", Some(2), Some(1)),
    (StyleFlag::Outline, "outline", Some(3), Some(3)),
    (StyleFlag::Shadow, "shadow", Some(4), None),
    (StyleFlag::Condensed, "condensed", Some(5), None),
    (StyleFlag::Extended, "extended", Some(6), None),
];

impl StyleFlag {
    pub const ALL: [StyleFlag; 8] = [
        Self::Regular,
        Self::Bold,
        Self::Italic,
        Self::Underline,
        Self::Outline,
        Self::Shadow,
        Self::Condensed,
        Self::Extended,
    ];

    fn entry(self) -> &'static (StyleFlag, &'static str, Option<u8>, Option<u8>) {
        // every variant has a row
        &STYLE_FLAG_BITS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn mac_style_bit(self) -> Option<u8> {
        self.entry().2
    }

    pub fn fs_selection_bit(self) -> Option<u8> {
        self.entry().3
    }
}

impl fmt::Display for StyleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StyleFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        STYLE_FLAG_BITS
            .iter()
            .find(|(_, name, _, _)| *name == s)
            .map(|(flag, ..)| *flag)
            .ok_or_else(|| Error::Argument(format!("unknown style flag {s:?}")))
    }
}

/// Style flag values, `None` meaning "leave as is" when writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleFlags {
    pub regular: Option<bool>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub outline: Option<bool>,
    pub shadow: Option<bool>,
    pub condensed: Option<bool>,
    pub extended: Option<bool>,
}

impl StyleFlags {
    pub fn get(&self, flag: StyleFlag) -> Option<bool> {
        match flag {
            StyleFlag::Regular => self.regular,
            StyleFlag::Bold => self.bold,
            StyleFlag::Italic => self.italic,
            StyleFlag::Underline => self.underline,
            StyleFlag::Outline => self.outline,
            StyleFlag::Shadow => self.shadow,
            StyleFlag::Condensed => self.condensed,
            StyleFlag::Extended => self.extended,
        }
    }

    pub fn set(&mut self, flag: StyleFlag, value: Option<bool>) {
        let slot = match flag {
            StyleFlag::Regular => &mut self.regular,
            StyleFlag::Bold => &mut self.bold,
            StyleFlag::Italic => &mut self.italic,
            StyleFlag::Underline => &mut self.underline,
            StyleFlag::Outline => &mut self.outline,
            StyleFlag::Shadow => &mut self.shadow,
            StyleFlag::Condensed => &mut self.condensed,
            StyleFlag::Extended => &mut self.extended,
        };
        *slot = value;
    }

    /// Flags implied by a RIBBI subfamily name, `None` for other names.
    pub fn from_subfamily_name(name: &str) -> Option<Self> {
        let (regular, bold, italic) = match name.trim().to_lowercase().as_str() {
            "regular" => (true, false, false),
            "bold" => (false, true, false),
            "italic" => (false, false, true),
            "bold italic" => (false, true, true),
            _ => return None,
        };
        Some(Self {
            regular: Some(regular),
            bold: Some(bold),
            italic: Some(italic),
            ..Self::default()
        })
    }
}

impl FontHandle {
    /// Every flag, set if either backing bit is set.
    pub fn get_style_flags(&self) -> Result<StyleFlags> {
        let font = self.font()?;
        let mac_style = font.head().map(|head| head.mac_style().bits()).unwrap_or(0);
        let fs_selection = font.os2().map(|os2| os2.fs_selection().bits()).unwrap_or(0);

        let mut flags = StyleFlags::default();
        for flag in StyleFlag::ALL {
            let mac = flag.mac_style_bit().is_some_and(|bit| get_flag(mac_style, bit));
            let fs = flag.fs_selection_bit().is_some_and(|bit| get_flag(fs_selection, bit));
            flags.set(flag, Some(mac || fs));
        }
        Ok(flags)
    }

    pub fn get_style_flag(&self, flag: StyleFlag) -> Result<bool> {
        Ok(self.get_style_flags()?.get(flag).unwrap_or(false))
    }

    pub fn set_style_flag(&mut self, flag: StyleFlag, value: bool) -> Result<()> {
        let mut flags = StyleFlags::default();
        flags.set(flag, Some(value));
        self.set_style_flags(flags)
    }

    /// Write the given flags to both tables in one pass.
    pub fn set_style_flags(&mut self, flags: StyleFlags) -> Result<()> {
        if flags == StyleFlags::default() {
            return Ok(());
        }
        self.rewrite(|font, builder| {
            if let Ok(head) = font.head() {
                let mut head: Head = head.to_owned_table();
                let mut bits = head.mac_style.bits();
                for flag in StyleFlag::ALL {
                    if let (Some(value), Some(bit)) = (flags.get(flag), flag.mac_style_bit()) {
                        bits = set_flag(bits, bit, value);
                    }
                }
                head.mac_style = MacStyle::from_bits_truncate(bits);
                builder.add_table(&head)?;
            }
            if let Ok(os2) = font.os2() {
                let mut os2: Os2 = os2.to_owned_table();
                let mut bits = os2.fs_selection.bits();
                for flag in StyleFlag::ALL {
                    if let (Some(value), Some(bit)) = (flags.get(flag), flag.fs_selection_bit()) {
                        bits = set_flag(bits, bit, value);
                    }
                }
                os2.fs_selection = SelectionFlags::from_bits_truncate(bits);
                builder.add_table(&os2)?;
            }
            Ok(())
        })?;
        debug!("set style flags {flags:?}");
        Ok(())
    }

    /// Derive regular/bold/italic from the subfamily name.
    ///
    /// Names other than Regular, Bold, Italic and Bold Italic leave the
    /// flags untouched.
    pub fn set_style_flags_by_subfamily_name(&mut self) -> Result<()> {
        let name = [TYPOGRAPHIC_SUBFAMILY_NAME, WWS_SUBFAMILY_NAME, SUBFAMILY_NAME]
            .into_iter()
            .find_map(|id| self.get_name(id).transpose())
            .transpose()?;
        match name.as_deref().and_then(StyleFlags::from_subfamily_name) {
            Some(flags) => self.set_style_flags(flags),
            None => Ok(()),
        }
    }
}
