//! Weight, width, slope and vertical metrics.

use log::info;
use read_fonts::{TableProvider, types::Tag};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{head::Head, hhea::Hhea, os2::Os2},
    types::FWord,
};

use crate::{
    error::{Error, Result},
    handle::FontHandle,
};

/// usWeightClass names, by nominal value.
static WEIGHTS: [(u16, &str); 12] = [
    (50, "Extra-thin"),
    (100, "Thin"),
    (200, "Extra-light"),
    (300, "Light"),
    (400, "Regular"),
    (450, "Book"),
    (500, "Medium"),
    (600, "Semi-bold"),
    (700, "Bold"),
    (800, "Extra-bold"),
    (900, "Black"),
    (950, "Extra-black"),
];

/// usWidthClass names, 1 to 9.
static WIDTHS: [&str; 9] = [
    "Ultra-condensed",
    "Extra-condensed",
    "Condensed",
    "Semi-condensed",
    "Medium",
    "Semi-expanded",
    "Expanded",
    "Extra-expanded",
    "Ultra-expanded",
];

const COLOR_TABLES: [&[u8; 4]; 5] = [b"COLR", b"CPAL", b"CBDT", b"sbix", b"SVG "];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightInfo {
    pub value: u16,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidthInfo {
    pub value: u16,
    /// `None` for the out-of-range class 0.
    pub name: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItalicAngle {
    pub value: f64,
    pub backslant: bool,
    pub italic: bool,
    pub roman: bool,
}

impl ItalicAngle {
    fn new(value: f64) -> Self {
        Self {
            value,
            backslant: value > 0.0,
            italic: value < 0.0,
            roman: value == 0.0,
        }
    }
}

/// Vertical metrics spread over head, hhea and OS/2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalMetrics {
    pub units_per_em: u16,
    pub hhea_ascent: i16,
    pub hhea_descent: i16,
    pub hhea_line_gap: i16,
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
    pub win_ascent: u16,
    pub win_descent: u16,
    /// Only present from OS/2 version 2.
    pub x_height: Option<i16>,
    pub cap_height: Option<i16>,
}

fn weight_info(value: u16) -> WeightInfo {
    let value = value.min(1000);
    // first entry wins ties
    let (_, name) = WEIGHTS
        .iter()
        .min_by_key(|(nominal, _)| nominal.abs_diff(value))
        .copied()
        .unwrap_or((400, "Regular"));
    WeightInfo { value, name }
}

fn width_info(value: u16) -> WidthInfo {
    let value = value.min(9);
    let name = value.checked_sub(1).map(|index| WIDTHS[usize::from(index)]);
    WidthInfo { value, name }
}

fn missing(tag: &str) -> Error {
    Error::Data(format!("font has no '{tag}' table"))
}

impl FontHandle {
    /// OS/2 weight class and its name, `None` without OS/2.
    pub fn get_weight(&self) -> Result<Option<WeightInfo>> {
        Ok(self.font()?.os2().ok().map(|os2| weight_info(os2.us_weight_class())))
    }

    /// OS/2 width class and its name, `None` without OS/2.
    pub fn get_width(&self) -> Result<Option<WidthInfo>> {
        Ok(self.font()?.os2().ok().map(|os2| width_info(os2.us_width_class())))
    }

    pub fn get_italic_angle(&self) -> Result<Option<ItalicAngle>> {
        Ok(self
            .font()?
            .post()
            .ok()
            .map(|post| ItalicAngle::new(post.italic_angle().to_f64())))
    }

    /// head fontRevision, rounded to three decimals.
    pub fn get_version(&self) -> Result<f64> {
        let head = self.font()?.head().map_err(|_| missing("head"))?;
        Ok((head.font_revision().to_f64() * 1000.0).round() / 1000.0)
    }

    pub fn is_monospace(&self) -> Result<bool> {
        let font = self.font()?;
        if font.post().is_ok_and(|post| post.is_fixed_pitch() != 0) {
            return Ok(true);
        }
        let Ok(hmtx) = font.hmtx() else {
            return Ok(false);
        };
        let mut advances = hmtx
            .h_metrics()
            .iter()
            .map(|metric| metric.advance())
            .filter(|advance| *advance != 0);
        let Some(first) = advances.next() else {
            return Ok(false);
        };
        Ok(advances.all(|advance| advance == first))
    }

    pub fn is_color(&self) -> Result<bool> {
        let font = self.font()?;
        Ok(COLOR_TABLES
            .iter()
            .any(|tag| font.table_data(Tag::new(tag)).is_some()))
    }

    pub fn get_vertical_metrics(&self) -> Result<VerticalMetrics> {
        let font = self.font()?;
        let head = font.head().map_err(|_| missing("head"))?;
        let hhea = font.hhea().map_err(|_| missing("hhea"))?;
        let os2 = font.os2().map_err(|_| missing("OS/2"))?;
        Ok(VerticalMetrics {
            units_per_em: head.units_per_em(),
            hhea_ascent: hhea.ascender().to_i16(),
            hhea_descent: hhea.descender().to_i16(),
            hhea_line_gap: hhea.line_gap().to_i16(),
            typo_ascender: os2.s_typo_ascender(),
            typo_descender: os2.s_typo_descender(),
            typo_line_gap: os2.s_typo_line_gap(),
            win_ascent: os2.us_win_ascent(),
            win_descent: os2.us_win_descent(),
            x_height: os2.sx_height(),
            cap_height: os2.s_cap_height(),
        })
    }

    /// Write vertical metrics. x and cap height are ignored for OS/2
    /// tables older than version 2.
    pub fn set_vertical_metrics(&mut self, metrics: &VerticalMetrics) -> Result<()> {
        self.rewrite(|font, builder| {
            let mut head: Head = font.head().map_err(|_| missing("head"))?.to_owned_table();
            head.units_per_em = metrics.units_per_em;
            builder.add_table(&head)?;

            let mut hhea: Hhea = font.hhea().map_err(|_| missing("hhea"))?.to_owned_table();
            hhea.ascender = FWord::new(metrics.hhea_ascent);
            hhea.descender = FWord::new(metrics.hhea_descent);
            hhea.line_gap = FWord::new(metrics.hhea_line_gap);
            builder.add_table(&hhea)?;

            let mut os2: Os2 = font.os2().map_err(|_| missing("OS/2"))?.to_owned_table();
            os2.s_typo_ascender = metrics.typo_ascender;
            os2.s_typo_descender = metrics.typo_descender;
            os2.s_typo_line_gap = metrics.typo_line_gap;
            os2.us_win_ascent = metrics.win_ascent;
            os2.us_win_descent = metrics.win_descent;
            if os2.sx_height.is_some() {
                os2.sx_height = metrics.x_height.or(os2.sx_height);
                os2.s_cap_height = metrics.cap_height.or(os2.s_cap_height);
            }
            builder.add_table(&os2)?;
            Ok(())
        })?;
        info!("set vertical metrics of {self}");
        Ok(())
    }
}
