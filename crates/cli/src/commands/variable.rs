use std::path::PathBuf;

use anyhow::Result;
use fonthandle::{CoordinateSpec, InstancerOptions, StaticOptions};

use crate::{
    io::{OutputArgs, open_font},
    parallel::run_parallel,
};

pub fn to_static(
    paths: &[PathBuf],
    spec: Option<&CoordinateSpec>,
    style: Option<&str>,
    options: StaticOptions,
    output: &OutputArgs,
) -> Result<()> {
    run_parallel("static", paths, |path| {
        let mut font = open_font(path)?;
        font.to_static(spec, style, options)?;
        let saved = output.save(&font)?;
        println!("  {} -> {}", path.display(), saved.display());
        Ok(())
    })
}

pub fn slice(
    paths: &[PathBuf],
    spec: &CoordinateSpec,
    options: &InstancerOptions,
    output: &OutputArgs,
) -> Result<()> {
    run_parallel("slice", paths, |path| {
        let mut font = open_font(path)?;
        font.to_sliced_variable(spec, options)?;
        let saved = output.save(&font)?;
        let tags = font.get_variable_axes_tags()?.unwrap_or_default();
        println!("  {} -> {} [{}]", path.display(), saved.display(), tags.join(","));
        Ok(())
    })
}
