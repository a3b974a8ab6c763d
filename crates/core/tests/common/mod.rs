//! Synthetic fonts shared by the integration tests.

#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use font_types::{F2Dot14, Fixed, NameId, Tag};
use fonthandle::{AxisLimit, Instancer, InstancerOptions};
use read_fonts::{tables::glyf::CurvePoint, types::GlyphId};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        fvar::{AxisInstanceArrays, Fvar, InstanceRecord, VariationAxisRecord},
        glyf::{Bbox, Contour, GlyfLocaBuilder, Glyph, SimpleGlyph},
        gvar::{GlyphDelta, GlyphDeltas, GlyphVariations, Gvar, Tent},
        head::{Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

pub const FAMILY: &str = "Test Sans";

/// An fvar axis: tag, min, default, max.
pub type Axis = (&'static str, f32, f32, f32);

/// A named instance: style name and coordinates in axis order.
pub type Instance = (&'static str, &'static [f32]);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn name_record(id: u16, value: &str) -> NameRecord {
    NameRecord::new(3, 1, 0x409, NameId::new(id), value.to_string().into())
}

/// A font with `.notdef` and a square glyph mapped from `A` and `B`.
///
/// With axes, the square's right edge moves by +100 at the max of the
/// first axis and by -50 at its min. Names describe "Test Sans Regular".
pub fn build_font(axes: &[Axis], instances: &[Instance]) -> Vec<u8> {
    let mut square = SimpleGlyph {
        bbox: Bbox::default(),
        contours: vec![Contour::from(
            [(100, 0), (100, 700), (400, 700), (400, 0)]
                .iter()
                .map(|&(x, y)| CurvePoint::on_curve(x, y))
                .collect::<Vec<_>>(),
        )],
        instructions: vec![],
    };
    square.recompute_bounding_box();

    let mut glyf_builder = GlyfLocaBuilder::new();
    glyf_builder.add_glyph(&Glyph::Empty).unwrap();
    glyf_builder.add_glyph(&Glyph::Simple(square)).unwrap();
    let (glyf, loca, loca_format) = glyf_builder.build();

    let mut names = vec![
        name_record(1, FAMILY),
        name_record(2, "Regular"),
        name_record(3, "1.000;NONE;TestSans-Regular"),
        name_record(4, "Test Sans Regular"),
        name_record(5, "Version 1.000"),
        name_record(6, "TestSans-Regular"),
    ];

    let mut builder = FontBuilder::new();

    if !axes.is_empty() {
        let variation_axes = axes
            .iter()
            .enumerate()
            .map(|(i, (tag, min, default, max))| {
                names.push(name_record(256 + i as u16, tag));
                VariationAxisRecord {
                    axis_tag: Tag::new_checked(tag.as_bytes()).unwrap(),
                    min_value: Fixed::from_f64(f64::from(*min)),
                    default_value: Fixed::from_f64(f64::from(*default)),
                    max_value: Fixed::from_f64(f64::from(*max)),
                    flags: 0u16,
                    axis_name_id: NameId::new(256 + i as u16),
                }
            })
            .collect();
        let instance_records = instances
            .iter()
            .enumerate()
            .map(|(i, (style, coords))| {
                names.push(name_record(300 + i as u16, style));
                InstanceRecord {
                    subfamily_name_id: NameId::new(300 + i as u16),
                    flags: 0,
                    coordinates: coords.iter().map(|v| Fixed::from_f64(f64::from(*v))).collect(),
                    post_script_name_id: None,
                }
            })
            .collect();
        let fvar = Fvar {
            axis_instance_arrays: AxisInstanceArrays {
                axes: variation_axes,
                instances: instance_records,
            }
            .into(),
        };

        let master = |peak: f32, dx: i16| {
            let mut tents = vec![Tent::new(F2Dot14::from_f32(peak), None)];
            tents.extend((1..axes.len()).map(|_| Tent::new(F2Dot14::from_f32(0.0), None)));
            // four outline points, then the phantom points
            let deltas = vec![
                GlyphDelta::required(0, 0),
                GlyphDelta::required(0, 0),
                GlyphDelta::required(dx, 0),
                GlyphDelta::required(dx, 0),
                GlyphDelta::required(0, 0),
                GlyphDelta::required(dx, 0),
                GlyphDelta::required(0, 0),
                GlyphDelta::required(0, 0),
            ];
            GlyphDeltas::new(tents, deltas)
        };
        let gvar = Gvar::new(
            vec![
                GlyphVariations::new(GlyphId::new(0), vec![]),
                GlyphVariations::new(GlyphId::new(1), vec![master(1.0, 100), master(-1.0, -50)]),
            ],
            axes.len() as u16,
        )
        .unwrap();
        builder.add_table(&fvar).unwrap();
        builder.add_table(&gvar).unwrap();
    }

    let head = Head {
        font_revision: Fixed::from_f64(1.0),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: write_fonts::tables::head::Flags::empty(),
        units_per_em: 1000,
        created: font_types::LongDateTime::new(0),
        modified: font_types::LongDateTime::new(0),
        x_min: 100,
        y_min: 0,
        x_max: 400,
        y_max: 700,
        mac_style: MacStyle::empty(),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    };
    let hhea = Hhea {
        ascender: font_types::FWord::new(800),
        descender: font_types::FWord::new(-200),
        line_gap: font_types::FWord::new(0),
        advance_width_max: font_types::UfWord::new(500),
        min_left_side_bearing: font_types::FWord::new(0),
        min_right_side_bearing: font_types::FWord::new(100),
        x_max_extent: font_types::FWord::new(400),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: 2,
    };
    let hmtx = Hmtx {
        h_metrics: vec![
            LongMetric { advance: 500, side_bearing: 0 },
            LongMetric { advance: 500, side_bearing: 100 },
        ],
        left_side_bearings: vec![],
    };
    let post = Post {
        version: font_types::Version16Dot16::VERSION_3_0,
        italic_angle: Fixed::from_f64(0.0),
        underline_position: font_types::FWord::new(-100),
        underline_thickness: font_types::FWord::new(50),
        is_fixed_pitch: 0,
        min_mem_type42: 0,
        max_mem_type42: 0,
        min_mem_type1: 0,
        max_mem_type1: 0,
        num_glyphs: None,
        glyph_name_index: None,
        string_data: None,
    };
    let os2 = Os2 {
        us_weight_class: 400,
        us_width_class: 5,
        fs_selection: SelectionFlags::REGULAR,
        s_typo_ascender: 800,
        s_typo_descender: -200,
        us_win_ascent: 800,
        us_win_descent: 200,
        ..Default::default()
    };
    let cmap = Cmap::from_mappings([('A', GlyphId::new(1)), ('B', GlyphId::new(1))]).unwrap();

    builder.add_table(&head).unwrap();
    builder.add_table(&hhea).unwrap();
    builder.add_table(&hmtx).unwrap();
    builder.add_table(&Maxp { num_glyphs: 2, ..Default::default() }).unwrap();
    builder.add_table(&post).unwrap();
    builder.add_table(&os2).unwrap();
    builder.add_table(&cmap).unwrap();
    builder.add_table(&glyf).unwrap();
    builder.add_table(&loca).unwrap();
    builder.add_table(&Name::new(names)).unwrap();
    builder.build()
}

/// wght 100..900 default 400, instances Thin, Regular and Bold.
pub fn weight_font() -> Vec<u8> {
    build_font(
        &[("wght", 100.0, 400.0, 900.0)],
        &[("Thin", &[100.0]), ("Regular", &[400.0]), ("Bold", &[700.0])],
    )
}

/// wght 100..900 and slnt -12..0, both defaulting to upright Regular.
pub fn slant_font() -> Vec<u8> {
    build_font(
        &[("wght", 100.0, 400.0, 900.0), ("slnt", -12.0, 0.0, 0.0)],
        &[
            ("Regular", &[400.0, 0.0]),
            ("Italic", &[400.0, -12.0]),
            ("Bold", &[700.0, 0.0]),
            ("Bold Italic", &[700.0, -12.0]),
        ],
    )
}

pub fn static_font() -> Vec<u8> {
    build_font(&[], &[])
}

/// A fresh directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fonthandle-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Records the limits it is asked for and returns the font unchanged.
#[derive(Clone, Default)]
pub struct RecordingInstancer {
    pub calls: Arc<Mutex<Vec<(Vec<AxisLimit>, InstancerOptions)>>>,
}

impl RecordingInstancer {
    pub fn calls(&self) -> Vec<(Vec<AxisLimit>, InstancerOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Instancer for RecordingInstancer {
    fn instantiate(
        &self,
        data: &[u8],
        limits: &[AxisLimit],
        options: &InstancerOptions,
    ) -> fonthandle::Result<Vec<u8>> {
        self.calls.lock().unwrap().push((limits.to_vec(), *options));
        Ok(data.to_vec())
    }
}
