use std::{
    fmt::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use fonthandle::{FontHandle, name_ids};
use log::error;
use read_fonts::{FontRef, TableProvider};

use crate::{io::open_font, parallel::collect_parallel};

/// Print a report for every font, in input order.
pub fn info(paths: &[PathBuf]) -> Result<()> {
    print_reports(paths, |path| describe(&open_font(path)?))
}

pub fn names(paths: &[PathBuf]) -> Result<()> {
    print_reports(paths, |path| {
        let font = open_font(path)?;
        let mut out = String::new();
        for (key, value) in font.get_names()? {
            let id = fonthandle::resolve_name_id(key.as_str())?;
            writeln!(out, "  {id:>3} {key}: {value}")?;
        }
        Ok(out)
    })
}

fn print_reports<F>(paths: &[PathBuf], report: F) -> Result<()>
where
    F: Fn(&Path) -> Result<String> + Sync + Send,
{
    let results = collect_parallel(paths, |path| {
        report(path).with_context(|| format!("Failed to read {}", path.display()))
    });

    let mut failed = 0;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(text) => print!("{}\n{text}", path.display()),
            Err(e) => {
                error!("{e:#}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} fonts could not be read", paths.len());
    }
    Ok(())
}

fn describe(font: &FontHandle) -> Result<String> {
    let mut out = String::new();
    let name = |id: u16| font.get_name(id).map(Option::unwrap_or_default);

    writeln!(out, "  format:       {}", font.get_format(false)?)?;
    writeln!(out, "  family:       {}", name(name_ids::FAMILY_NAME)?)?;
    writeln!(out, "  style:        {}", name(name_ids::SUBFAMILY_NAME)?)?;
    writeln!(out, "  postscript:   {}", name(name_ids::POSTSCRIPT_NAME)?)?;
    writeln!(out, "  version:      {:.3}", font.get_version()?)?;
    if let Some(weight) = font.get_weight()? {
        writeln!(out, "  weight:       {} {}", weight.value, weight.name)?;
    }
    if let Some(width) = font.get_width()? {
        writeln!(out, "  width:        {} {}", width.value, width.name.unwrap_or("?"))?;
    }
    if let Some(angle) = font.get_italic_angle()? {
        let kind = if angle.roman {
            "roman"
        } else if angle.backslant {
            "backslant"
        } else {
            "italic"
        };
        writeln!(out, "  italic angle: {} ({kind})", angle.value)?;
    }

    let flags = font.get_style_flags()?;
    let set: Vec<&str> = fonthandle::StyleFlag::ALL
        .iter()
        .filter(|flag| flags.get(**flag) == Some(true))
        .map(|flag| flag.name())
        .collect();
    writeln!(out, "  style flags:  {}", set.join(", "))?;
    writeln!(out, "  monospace:    {}", yes_no(font.is_monospace()?))?;
    writeln!(out, "  color:        {}", yes_no(font.is_color()?))?;
    writeln!(
        out,
        "  glyphs:       {} ({} characters)",
        font.get_glyphs_count()?,
        font.get_characters_count()?
    )?;
    let features = font.get_features_tags()?;
    if !features.is_empty() {
        writeln!(out, "  features:     {}", features.join(", "))?;
    }

    let metrics = font.get_vertical_metrics()?;
    writeln!(
        out,
        "  metrics:      upm {}, hhea {}/{}/{}, typo {}/{}/{}, win {}/{}",
        metrics.units_per_em,
        metrics.hhea_ascent,
        metrics.hhea_descent,
        metrics.hhea_line_gap,
        metrics.typo_ascender,
        metrics.typo_descender,
        metrics.typo_line_gap,
        metrics.win_ascent,
        metrics.win_descent,
    )?;

    let head = FontRef::new(font.data()?)?.head()?;
    for (label, seconds) in [("created", head.created().as_secs()), ("modified", head.modified().as_secs())] {
        if let Some(date) = font_date(seconds) {
            writeln!(out, "  {label:<13} {}", date.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
    }

    if let Some(axes) = font.get_variable_axes()? {
        writeln!(out, "  axes:")?;
        for axis in axes {
            writeln!(
                out,
                "    {} ({}): {} {} {}",
                axis.tag, axis.name, axis.min_value, axis.default_value, axis.max_value
            )?;
        }
    }
    if let Some(instances) = font.get_variable_instances()? {
        writeln!(out, "  instances:")?;
        for instance in instances {
            let coordinates: Vec<String> = instance
                .coordinates
                .iter()
                .map(|(tag, value)| format!("{tag}={value}"))
                .collect();
            writeln!(out, "    {}: {}", instance.style_name, coordinates.join(", "))?;
        }
    }
    Ok(out)
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// A `head` timestamp, counted in seconds from 1904-01-01.
fn font_date(seconds: i64) -> Option<DateTime<Utc>> {
    let epoch = Utc.with_ymd_and_hms(1904, 1, 1, 0, 0, 0).single()?;
    epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_dates_start_in_1904() {
        let date = font_date(0).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "1904-01-01");
        // 2024-01-01 00:00:00
        let date = font_date(3_786_912_000).unwrap();
        assert_eq!(date.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-01 00:00:00");
    }
}
