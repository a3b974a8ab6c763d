//! Instancing and nearest-instance search on synthetic variable fonts.

mod common;

use common::{RecordingInstancer, init_logging, slant_font, static_font, weight_font};
use fonthandle::{
    AxisValue, CoordinateSpec, Coordinates, FontHandle, InstancerOptions, Limit, OverlapMode, StaticOptions,
    StyleFlag, coordinates,
};
use read_fonts::{FontRef, TableProvider, types::GlyphId};

/// Advance of the square glyph at the font's default location.
fn square_advance(font: &FontHandle) -> u16 {
    let font = FontRef::new(font.data().unwrap()).unwrap();
    font.hmtx().unwrap().advance(GlyphId::new(1)).unwrap()
}

fn lookup(values: &[(&str, f64)]) -> Coordinates {
    values.iter().map(|(tag, value)| (tag.to_string(), *value)).collect()
}

#[test]
fn axes_and_instances() {
    let font = FontHandle::from_bytes(slant_font()).unwrap();
    assert!(font.is_variable().unwrap());
    assert_eq!(font.get_variable_axes_tags().unwrap().unwrap(), ["wght", "slnt"]);

    let slnt = font.get_variable_axis_by_tag("slnt").unwrap().unwrap();
    assert_eq!(slnt.name, "Slant");
    assert_eq!((slnt.min_value, slnt.default_value, slnt.max_value), (-12.0, 0.0, 0.0));
    assert_eq!(font.get_variable_axis_by_tag("wdth").unwrap(), None);

    let instances = font.get_variable_instances().unwrap().unwrap();
    let names: Vec<_> = instances.iter().map(|i| i.style_name.as_str()).collect();
    assert_eq!(names, ["Regular", "Italic", "Bold", "Bold Italic"]);
    assert_eq!(instances[3].coordinates, lookup(&[("wght", 700.0), ("slnt", -12.0)]));
    assert_eq!(instances[0].postscript_name, None);
}

#[test]
fn closest_instance() {
    let font = FontHandle::from_bytes(weight_font()).unwrap();
    let closest = |values: &[(&str, f64)]| {
        font.get_variable_instance_closest_to_coordinates(&lookup(values))
            .unwrap()
            .unwrap()
            .style_name
    };
    assert_eq!(closest(&[("wght", 650.0)]), "Bold");
    assert_eq!(closest(&[("wght", 120.0)]), "Thin");
    // missing axes count as their default
    assert_eq!(closest(&[]), "Regular");
    // equidistant from Thin and Regular, the first declared wins
    assert_eq!(closest(&[("wght", 250.0)]), "Thin");
}

#[test]
fn closest_instance_fills_other_axes_with_defaults() {
    let font = FontHandle::from_bytes(slant_font()).unwrap();
    let instance = font
        .get_variable_instance_closest_to_coordinates(&lookup(&[("wght", 690.0)]))
        .unwrap()
        .unwrap();
    assert_eq!(instance.style_name, "Bold");
}

#[test]
fn to_static_end_to_end() {
    init_logging();
    let mut font = FontHandle::from_bytes(weight_font()).unwrap();
    let spec = coordinates([("wght", 650.0)]);
    font.to_static(Some(&spec), None, StaticOptions::default()).unwrap();

    assert!(!font.is_variable().unwrap());
    assert_eq!(font.get_weight().unwrap().unwrap().value, 650);
    assert_eq!(font.get_name("subfamily_name").unwrap().as_deref(), Some("Bold"));
    assert_eq!(font.get_name("typographic_subfamily_name").unwrap().as_deref(), Some("Bold"));
    assert_eq!(font.get_name("full_name").unwrap().as_deref(), Some("Test Sans Bold"));
    assert_eq!(font.get_name("postscript_name").unwrap().as_deref(), Some("TestSans-Bold"));
    assert_eq!(
        font.get_name("unique_identifier").unwrap().as_deref(),
        Some("1.000;NONE;TestSans-Bold")
    );
    assert!(font.get_style_flag(StyleFlag::Bold).unwrap());
    assert!(!font.get_style_flag(StyleFlag::Regular).unwrap());

    let err = font.to_static(Some(&spec), None, StaticOptions::default()).unwrap_err();
    assert!(err.is_operation());
}

#[test]
fn to_static_without_renaming() {
    let mut font = FontHandle::from_bytes(weight_font()).unwrap();
    let spec = coordinates([("wght", 900.0)]);
    let options = StaticOptions::default().with_update_names(false);
    font.to_static(Some(&spec), None, options).unwrap();
    assert!(font.is_static().unwrap());
    assert_eq!(font.get_name("subfamily_name").unwrap().as_deref(), Some("Regular"));
}

#[test]
fn to_static_by_style_name() {
    let mut font = FontHandle::from_bytes(slant_font()).unwrap();
    font.to_static(None, Some(" bold  italic "), StaticOptions::default()).unwrap();

    assert_eq!(font.get_weight().unwrap().unwrap().value, 700);
    assert_eq!(font.get_name("subfamily_name").unwrap().as_deref(), Some("Bold Italic"));
    let flags = font.get_style_flags().unwrap();
    assert_eq!(flags.bold, Some(true));
    assert_eq!(flags.italic, Some(true));
    assert_eq!(flags.regular, Some(false));
}

#[test]
fn negative_slant_forces_italic() {
    let mut font = FontHandle::from_bytes(slant_font()).unwrap();
    // equally close to Regular and Italic, Regular is declared first
    let spec = coordinates([("slnt", -6.0)]);
    font.to_static(Some(&spec), None, StaticOptions::default()).unwrap();

    assert_eq!(font.get_name("subfamily_name").unwrap().as_deref(), Some("Regular"));
    assert!(font.get_style_flag(StyleFlag::Italic).unwrap());
    assert!(!font.get_style_flag(StyleFlag::Regular).unwrap());
}

#[test]
fn to_static_argument_errors() {
    let mut font = FontHandle::from_bytes(weight_font()).unwrap();
    let options = StaticOptions::default();

    let spec = coordinates([("wght", 700.0)]);
    assert!(font.to_static(Some(&spec), Some("Bold"), options).unwrap_err().is_argument());
    assert!(font.to_static(None, Some("Heavy"), options).unwrap_err().is_argument());

    let spec = coordinates([("wdth", 100.0)]);
    assert!(font.to_static(Some(&spec), None, options).unwrap_err().is_argument());

    let spec = coordinates([("wght", AxisValue::range(300.0, 500.0))]);
    assert!(font.to_static(Some(&spec), None, options).unwrap_err().is_argument());

    assert!(font.is_variable().unwrap());
}

#[test]
fn to_static_fills_missing_axes() {
    let instancer = RecordingInstancer::default();
    let mut font = FontHandle::from_bytes(slant_font())
        .unwrap()
        .with_instancer(instancer.clone());
    let spec = coordinates([("wght", 700.0)]);
    font.to_static(Some(&spec), None, StaticOptions::default()).unwrap();

    let calls = instancer.calls();
    assert_eq!(calls.len(), 1);
    let (limits, options) = &calls[0];
    let limits: Vec<_> = limits.iter().map(|l| (l.tag.to_string(), l.limit)).collect();
    assert_eq!(
        limits,
        [("wght".to_string(), Limit::Pin(700.0)), ("slnt".to_string(), Limit::Default)]
    );
    assert!(options.optimize);
    assert_eq!(options.overlap, OverlapMode::Remove);
}

#[test]
fn to_static_on_static_font() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    let err = font.to_static(None, None, StaticOptions::default()).unwrap_err();
    assert!(err.is_operation());
}

#[test]
fn sliced_variable() {
    let mut font = FontHandle::from_bytes(weight_font()).unwrap();
    let spec = coordinates([("wght", AxisValue::range(100.0, 400.0))]);
    font.to_sliced_variable(&spec, &InstancerOptions::default()).unwrap();

    assert!(font.is_variable().unwrap());
    let axis = font.get_variable_axis_by_tag("wght").unwrap().unwrap();
    assert_eq!((axis.min_value, axis.default_value, axis.max_value), (100.0, 400.0, 400.0));
    let instances = font.get_variable_instances().unwrap().unwrap();
    let names: Vec<_> = instances.iter().map(|i| i.style_name.as_str()).collect();
    assert_eq!(names, ["Thin", "Regular"]);
}

#[test]
fn sliced_variable_pins_some_axes() {
    let mut font = FontHandle::from_bytes(slant_font()).unwrap();
    let spec = coordinates([("slnt", 0.0)]);
    font.to_sliced_variable(&spec, &InstancerOptions::default()).unwrap();
    assert_eq!(font.get_variable_axes_tags().unwrap().unwrap(), ["wght"]);
}

#[test]
fn sliced_variable_covering_every_axis_with_one_range() {
    init_logging();
    let mut font = FontHandle::from_bytes(slant_font()).unwrap();
    let spec = coordinates([("wght", AxisValue::Pin(700.0)), ("slnt", AxisValue::range(-12.0, 0.0))]);
    font.to_sliced_variable(&spec, &InstancerOptions::default()).unwrap();

    assert!(font.is_variable().unwrap());
    assert_eq!(font.get_variable_axes_tags().unwrap().unwrap(), ["slnt"]);
    let instances = font.get_variable_instances().unwrap().unwrap();
    let names: Vec<_> = instances.iter().map(|i| i.style_name.as_str()).collect();
    assert_eq!(names, ["Bold", "Bold Italic"]);
    assert_eq!(square_advance(&font), 560);
}

#[test]
fn sliced_variable_moves_default() {
    let mut font = FontHandle::from_bytes(weight_font()).unwrap();
    let spec = coordinates([("wght", (100.0, 700.0, 900.0))]);
    font.to_sliced_variable(&spec, &InstancerOptions::default()).unwrap();

    let axis = font.get_variable_axis_by_tag("wght").unwrap().unwrap();
    assert_eq!((axis.min_value, axis.default_value, axis.max_value), (100.0, 700.0, 900.0));
    assert_eq!(font.get_variable_instances().unwrap().unwrap().len(), 3);
    // the default outline is now the 700 one
    assert_eq!(square_advance(&font), 560);
    assert_eq!(font.get_weight().unwrap().unwrap().value, 700);
}

#[test]
fn sliced_variable_limits_clamp_default_into_range() {
    let mut font = FontHandle::from_bytes(weight_font()).unwrap();
    let spec = coordinates([(
        "wght",
        AxisValue::Limits {
            min: Some(500.0),
            default: None,
            max: None,
        },
    )]);
    font.to_sliced_variable(&spec, &InstancerOptions::default()).unwrap();

    let axis = font.get_variable_axis_by_tag("wght").unwrap().unwrap();
    assert_eq!((axis.min_value, axis.default_value, axis.max_value), (500.0, 500.0, 900.0));
    let instances = font.get_variable_instances().unwrap().unwrap();
    let names: Vec<_> = instances.iter().map(|i| i.style_name.as_str()).collect();
    assert_eq!(names, ["Bold"]);
    assert_eq!(square_advance(&font), 520);
}

#[test]
fn sliced_variable_limits() {
    let instancer = RecordingInstancer::default();
    let mut font = FontHandle::from_bytes(weight_font())
        .unwrap()
        .with_instancer(instancer.clone());

    let spec = coordinates([(
        "wght",
        AxisValue::Limits {
            min: Some(200.0),
            default: None,
            max: None,
        },
    )]);
    font.to_sliced_variable(&spec, &InstancerOptions::default()).unwrap();

    let calls = instancer.calls();
    let (limits, options) = &calls[0];
    assert_eq!(
        limits[0].limit,
        Limit::Range {
            min: 200.0,
            default: Some(400.0),
            max: 900.0
        }
    );
    assert_eq!(options.overlap, OverlapMode::KeepAndSetFlags);
}

#[test]
fn sliced_variable_argument_errors() {
    let instancer = RecordingInstancer::default();
    let mut font = FontHandle::from_bytes(weight_font())
        .unwrap()
        .with_instancer(instancer.clone());
    let options = InstancerOptions::default();

    let empty = CoordinateSpec::new();
    assert!(font.to_sliced_variable(&empty, &options).unwrap_err().is_argument());

    let unknown = coordinates([("wdth", AxisValue::range(75.0, 100.0))]);
    assert!(font.to_sliced_variable(&unknown, &options).unwrap_err().is_argument());

    let pinned = coordinates([("wght", 500.0)]);
    assert!(font.to_sliced_variable(&pinned, &options).unwrap_err().is_argument());

    let default = coordinates([("wght", AxisValue::Default)]);
    assert!(font.to_sliced_variable(&default, &options).unwrap_err().is_argument());

    assert!(instancer.calls().is_empty());
}
