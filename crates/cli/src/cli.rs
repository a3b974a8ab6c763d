//! CLI definitions and command dispatch.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fonthandle::{AxisValue, NameKey, StyleFlag};

use crate::{
    args::{Format, Overlap, parse_axis, parse_name_assignment},
    commands,
    io::{OutputArgs, expand_inputs},
};

#[derive(Parser)]
#[command(name = "fonthandle", version)]
#[command(about = "Inspect, rename, instance, subset and convert OpenType fonts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Font files or glob patterns.
#[derive(Debug, Clone, clap::Args)]
pub struct Inputs {
    #[arg(required = true)]
    pub files: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print format, names, metrics and axes.
    Info {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Print every name record with a known key.
    Names {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Set or delete name records.
    SetName {
        /// KEY=VALUE, the key is a name id or e.g. `family_name`.
        #[arg(short, long = "name", value_parser = parse_name_assignment)]
        names: Vec<(NameKey, String)>,
        #[arg(short, long)]
        delete: Vec<NameKey>,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Rename the family and/or style, updating all related names.
    Rename {
        #[arg(short, long)]
        family: Option<String>,
        #[arg(short, long)]
        style: Option<String>,
        /// Leave the style flags alone.
        #[arg(long)]
        keep_style_flags: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Turn style flags on or off.
    SetStyleFlags {
        #[arg(long, value_delimiter = ',')]
        on: Vec<StyleFlag>,
        #[arg(long, value_delimiter = ',')]
        off: Vec<StyleFlag>,
        /// Derive bold, italic and regular from the subfamily name.
        #[arg(long, conflicts_with_all = ["on", "off"])]
        from_subfamily: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Instance variable fonts to static fonts.
    Static {
        /// TAG=VALUE, missing axes stay at their default.
        #[arg(short, long = "axis", value_parser = parse_axis, conflicts_with = "style")]
        axes: Vec<(String, AxisValue)>,
        /// A named instance to instance at.
        #[arg(short, long)]
        style: Option<String>,
        #[arg(long)]
        keep_names: bool,
        #[arg(long)]
        keep_style_flags: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Pin or restrict some axes, keeping the font variable.
    Slice {
        /// TAG=VALUE or TAG=MIN:MAX or TAG=MIN:DEFAULT:MAX.
        #[arg(short, long = "axis", value_parser = parse_axis, required = true)]
        axes: Vec<(String, AxisValue)>,
        #[arg(long)]
        no_optimize: bool,
        #[arg(long, value_enum, default_value_t)]
        overlap: Overlap,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Keep only the given characters or glyphs.
    Subset {
        /// Code points like `U+0041-005A,U+00E9`.
        #[arg(short, long)]
        unicodes: Option<String>,
        #[arg(short, long, value_delimiter = ',')]
        glyphs: Vec<String>,
        #[arg(short, long)]
        text: Option<String>,
        /// Layout features to keep, all when omitted.
        #[arg(long, value_delimiter = ',')]
        layout_features: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',')]
        drop_tables: Vec<String>,
        #[arg(long)]
        retain_glyph_names: bool,
        #[arg(long)]
        no_hinting: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Convert between TTF/OTF, WOFF and WOFF2.
    Convert {
        #[arg(short = 'f', long, value_enum)]
        to: Format,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Print the canonical file name of each font.
    Filename {
        #[arg(long, default_value = "Variable")]
        variable_suffix: String,
        #[arg(long)]
        no_axes_tags: bool,
        #[arg(long)]
        axes_values: bool,
        #[command(flatten)]
        inputs: Inputs,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Info { inputs } => commands::info(&expand_inputs(&inputs.files)?),
            Commands::Names { inputs } => commands::names(&expand_inputs(&inputs.files)?),
            Commands::SetName {
                names,
                delete,
                output,
                inputs,
            } => commands::set_names(&expand_inputs(&inputs.files)?, &names, &delete, &output),
            Commands::Rename {
                family,
                style,
                keep_style_flags,
                output,
                inputs,
            } => commands::rename(
                &expand_inputs(&inputs.files)?,
                family.as_deref(),
                style.as_deref(),
                !keep_style_flags,
                &output,
            ),
            Commands::SetStyleFlags {
                on,
                off,
                from_subfamily,
                output,
                inputs,
            } => {
                let change = if from_subfamily {
                    commands::FlagChange::FromSubfamily
                } else {
                    commands::FlagChange::Set { on, off }
                };
                commands::set_style_flags(&expand_inputs(&inputs.files)?, &change, &output)
            }
            Commands::Static {
                axes,
                style,
                keep_names,
                keep_style_flags,
                output,
                inputs,
            } => {
                let options = fonthandle::StaticOptions::default()
                    .with_update_names(!keep_names)
                    .with_update_style_flags(!keep_style_flags);
                let spec = (!axes.is_empty()).then(|| fonthandle::coordinates(axes));
                commands::to_static(
                    &expand_inputs(&inputs.files)?,
                    spec.as_ref(),
                    style.as_deref(),
                    options,
                    &output,
                )
            }
            Commands::Slice {
                axes,
                no_optimize,
                overlap,
                output,
                inputs,
            } => {
                let options = fonthandle::InstancerOptions::new()
                    .with_optimize(!no_optimize)
                    .with_overlap(overlap.into());
                commands::slice(
                    &expand_inputs(&inputs.files)?,
                    &fonthandle::coordinates(axes),
                    &options,
                    &output,
                )
            }
            Commands::Subset {
                unicodes,
                glyphs,
                text,
                layout_features,
                drop_tables,
                retain_glyph_names,
                no_hinting,
                output,
                inputs,
            } => {
                let mut options = fonthandle::SubsetOptions::default()
                    .with_drop_tables(drop_tables)
                    .with_retain_glyph_names(retain_glyph_names)
                    .with_no_hinting(no_hinting);
                if let Some(features) = layout_features {
                    options = options.with_layout_features(features);
                }
                let request = commands::SubsetRequest {
                    unicodes,
                    glyphs,
                    text,
                    options,
                };
                commands::subset(&expand_inputs(&inputs.files)?, &request, &output)
            }
            Commands::Convert { to, output, inputs } => {
                commands::convert(&expand_inputs(&inputs.files)?, to, &output)
            }
            Commands::Filename {
                variable_suffix,
                no_axes_tags,
                axes_values,
                inputs,
            } => {
                let options = fonthandle::FilenameOptions::default()
                    .with_variable_suffix(variable_suffix)
                    .with_variable_axes_tags(!no_axes_tags)
                    .with_variable_axes_values(axes_values);
                commands::filenames(&expand_inputs(&inputs.files)?, &options)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_static_axes() {
        let cli = Cli::try_parse_from([
            "fonthandle", "static", "-a", "wght=650", "--axis", "wdth=default", "Font.ttf",
        ])
        .unwrap();
        let Commands::Static { axes, style, inputs, .. } = cli.command else {
            panic!("expected static");
        };
        assert_eq!(
            axes,
            [("wght".to_string(), AxisValue::Pin(650.0)), ("wdth".to_string(), AxisValue::Default)]
        );
        assert_eq!(style, None);
        assert_eq!(inputs.files, ["Font.ttf"]);
    }

    #[test]
    fn axes_conflict_with_style() {
        let result =
            Cli::try_parse_from(["fonthandle", "static", "-a", "wght=700", "-s", "Bold", "Font.ttf"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_style_flags() {
        let cli = Cli::try_parse_from([
            "fonthandle", "set-style-flags", "--on", "bold,italic", "--off", "regular", "Font.ttf",
        ])
        .unwrap();
        let Commands::SetStyleFlags { on, off, .. } = cli.command else {
            panic!("expected set-style-flags");
        };
        assert_eq!(on, [StyleFlag::Bold, StyleFlag::Italic]);
        assert_eq!(off, [StyleFlag::Regular]);
    }

    #[test]
    fn convert_requires_format() {
        assert!(Cli::try_parse_from(["fonthandle", "convert", "Font.ttf"]).is_err());
        let cli = Cli::try_parse_from(["fonthandle", "convert", "--to", "woff2", "-o", "web", "Font.ttf"]).unwrap();
        let Commands::Convert { to, output, .. } = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(to, Format::Woff2);
        assert_eq!(output.output_dir.as_deref(), Some(std::path::Path::new("web")));
    }
}
