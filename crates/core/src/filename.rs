//! Canonical file names derived from font names and axes.

use crate::{
    axes::VariableAxis,
    error::{Error, Result},
    handle::FontHandle,
    names::{FAMILY_NAME, POSTSCRIPT_NAME, SUBFAMILY_NAME, TYPOGRAPHIC_FAMILY_NAME, TYPOGRAPHIC_SUBFAMILY_NAME},
};

/// Options for [`FontHandle::get_filename`].
#[derive(Debug, Clone)]
pub struct FilenameOptions {
    /// Appended to variable font names as `-{suffix}`, skipped when empty.
    pub variable_suffix: String,
    pub variable_axes_tags: bool,
    /// Add `(min,default,max)` after each axis tag.
    pub variable_axes_values: bool,
}

impl Default for FilenameOptions {
    fn default() -> Self {
        Self {
            variable_suffix: "Variable".into(),
            variable_axes_tags: true,
            variable_axes_values: false,
        }
    }
}

impl FilenameOptions {
    pub fn with_variable_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.variable_suffix = suffix.into();
        self
    }

    pub fn with_variable_axes_tags(mut self, tags: bool) -> Self {
        self.variable_axes_tags = tags;
        self
    }

    pub fn with_variable_axes_values(mut self, values: bool) -> Self {
        self.variable_axes_values = values;
        self
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn axes_part(axes: &[VariableAxis], with_values: bool) -> String {
    let axes: Vec<String> = axes
        .iter()
        .map(|axis| {
            if with_values {
                format!(
                    "{}({},{},{})",
                    axis.tag,
                    format_value(axis.min_value),
                    format_value(axis.default_value),
                    format_value(axis.max_value)
                )
            } else {
                axis.tag.clone()
            }
        })
        .collect();
    format!("[{}]", axes.join(","))
}

impl FontHandle {
    /// A file name for the font in its current format.
    ///
    /// Static fonts use the PostScript name. Variable fonts use the family
    /// name, followed by `-Italic` for italic styles, the variable suffix
    /// and the axes.
    pub fn get_filename(&self, options: &FilenameOptions) -> Result<String> {
        let extension = self.get_format(false)?.extension();

        let Some(axes) = self.get_variable_axes()? else {
            let postscript = self
                .get_name(POSTSCRIPT_NAME)?
                .ok_or_else(|| Error::Data("font has no PostScript name".into()))?;
            return Ok(format!("{postscript}.{extension}"));
        };

        let family = match self.get_name(TYPOGRAPHIC_FAMILY_NAME)? {
            Some(family) => family,
            None => self.get_name(FAMILY_NAME)?.unwrap_or_default(),
        };
        let style = match self.get_name(TYPOGRAPHIC_SUBFAMILY_NAME)? {
            Some(style) => style,
            None => self.get_name(SUBFAMILY_NAME)?.unwrap_or_default(),
        };

        let mut name = family.replace(' ', "");
        if style.to_lowercase().contains("italic") {
            name.push_str("-Italic");
        }
        if !options.variable_suffix.is_empty() {
            name.push('-');
            name.push_str(&options.variable_suffix);
        }
        if options.variable_axes_tags {
            name.push_str(&axes_part(&axes, options.variable_axes_values));
        }
        Ok(format!("{name}.{extension}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(tag: &str, min: f64, default: f64, max: f64) -> VariableAxis {
        VariableAxis {
            tag: tag.into(),
            name: tag.into(),
            min_value: min,
            default_value: default,
            max_value: max,
        }
    }

    #[test]
    fn axes_list() {
        let axes = [axis("wght", 100.0, 400.0, 900.0), axis("wdth", 75.0, 100.0, 112.5)];
        assert_eq!(axes_part(&axes, false), "[wght,wdth]");
        assert_eq!(axes_part(&axes, true), "[wght(100,400,900),wdth(75,100,112.5)]");
    }
}
