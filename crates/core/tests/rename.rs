//! Renaming and style flags.

mod common;

use common::{FAMILY, static_font};
use fonthandle::{FontHandle, StyleFlag, StyleFlags};

fn name(font: &FontHandle, key: &str) -> String {
    font.get_name(key).unwrap().unwrap_or_default()
}

#[test]
fn rename_ribbi_style() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    font.rename(Some("Acme Grotesk"), Some("Bold Italic"), true).unwrap();

    assert_eq!(name(&font, "family_name"), "Acme Grotesk");
    assert_eq!(name(&font, "subfamily_name"), "Bold Italic");
    assert_eq!(name(&font, "full_name"), "Acme Grotesk Bold Italic");
    assert_eq!(name(&font, "postscript_name"), "AcmeGrotesk-BoldItalic");
    assert_eq!(name(&font, "unique_identifier"), "1.000;NONE;AcmeGrotesk-BoldItalic");
    assert_eq!(name(&font, "typographic_family_name"), "Acme Grotesk");
    assert_eq!(name(&font, "typographic_subfamily_name"), "Bold Italic");
    assert_eq!(name(&font, "wws_family_name"), "Acme Grotesk");
    assert_eq!(name(&font, "wws_subfamily_name"), "Bold Italic");

    let flags = font.get_style_flags().unwrap();
    assert_eq!(flags.bold, Some(true));
    assert_eq!(flags.italic, Some(true));
    assert_eq!(flags.regular, Some(false));
}

#[test]
fn rename_other_style() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    font.rename(None, Some("Light Italic"), true).unwrap();

    assert_eq!(name(&font, "family_name"), "Test Sans Light Italic");
    assert_eq!(name(&font, "subfamily_name"), "Italic");
    assert_eq!(name(&font, "typographic_family_name"), FAMILY);
    assert_eq!(name(&font, "typographic_subfamily_name"), "Light Italic");
    assert_eq!(name(&font, "postscript_name"), "TestSans-LightItalic");
    // not a RIBBI name, flags are left alone
    assert!(font.get_style_flag(StyleFlag::Regular).unwrap());

    font.set_style_name("Semibold").unwrap();
    assert_eq!(name(&font, "subfamily_name"), "Regular");
    assert_eq!(name(&font, "full_name"), "Test Sans Semibold");
}

#[test]
fn blank_names_keep_current() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    font.rename(Some("   "), Some("Bold"), false).unwrap();
    assert_eq!(name(&font, "full_name"), "Test Sans Bold");
    assert!(!font.get_style_flag(StyleFlag::Bold).unwrap());

    font.set_family_name("Other Sans").unwrap();
    // the typographic subfamily written above is now the current style
    assert_eq!(name(&font, "full_name"), "Other Sans Bold");
    assert_eq!(name(&font, "postscript_name"), "OtherSans-Bold");
}

#[test]
fn full_name_is_deduplicated() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    font.rename(Some("Test Sans Bold"), Some("Bold"), true).unwrap();
    assert_eq!(name(&font, "full_name"), "Test Sans Bold");
}

#[test]
fn postscript_name_is_sanitized() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    font.rename(Some("Café (Display)"), Some("Regular"), true).unwrap();
    let postscript = name(&font, "postscript_name");
    assert_eq!(postscript, "CafDisplay-Regular");
    assert!(postscript.is_ascii());
}

#[test]
fn long_postscript_name_fails_without_changes() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    let before = font.data().unwrap().to_vec();
    let family = "A".repeat(60);

    let err = font.rename(Some(&family), Some("Regular"), true).unwrap_err();
    assert!(err.is_argument());
    assert_eq!(font.data().unwrap(), before.as_slice());
    assert_eq!(name(&font, "family_name"), FAMILY);
}

#[test]
fn style_flags_from_subfamily() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    font.set_name("subfamily_name", "Italic").unwrap();
    font.set_style_flags_by_subfamily_name().unwrap();

    let flags = font.get_style_flags().unwrap();
    assert_eq!(flags.italic, Some(true));
    assert_eq!(flags.regular, Some(false));
    assert_eq!(flags.bold, Some(false));
}

#[test]
fn set_several_flags() {
    let mut font = FontHandle::from_bytes(static_font()).unwrap();
    font.set_style_flags(StyleFlags {
        underline: Some(true),
        outline: Some(true),
        condensed: Some(true),
        ..StyleFlags::default()
    })
    .unwrap();

    let flags = font.get_style_flags().unwrap();
    assert_eq!(flags.underline, Some(true));
    assert_eq!(flags.outline, Some(true));
    assert_eq!(flags.condensed, Some(true));
    assert_eq!(flags.extended, Some(false));
    assert_eq!(flags.regular, Some(true));
}
