use std::path::PathBuf;

use anyhow::Result;
use fonthandle::{FilenameOptions, SubsetOptions};

use crate::{
    args::Format,
    io::{OutputArgs, open_font},
    parallel::run_parallel,
};

/// What to keep when subsetting.
#[derive(Debug, Clone, Default)]
pub struct SubsetRequest {
    pub unicodes: Option<String>,
    pub glyphs: Vec<String>,
    pub text: Option<String>,
    pub options: SubsetOptions,
}

pub fn subset(paths: &[PathBuf], request: &SubsetRequest, output: &OutputArgs) -> Result<()> {
    let glyphs: Vec<&str> = request.glyphs.iter().map(String::as_str).collect();
    run_parallel("subset", paths, |path| {
        let mut font = open_font(path)?;
        let before = font.get_glyphs_count()?;
        font.subset(
            request.unicodes.as_deref(),
            Some(glyphs.as_slice()),
            request.text.as_deref(),
            &request.options,
        )?;
        let saved = output.save(&font)?;
        println!(
            "  {} -> {} ({before} -> {} glyphs)",
            path.display(),
            saved.display(),
            font.get_glyphs_count()?
        );
        Ok(())
    })
}

pub fn convert(paths: &[PathBuf], to: Format, output: &OutputArgs) -> Result<()> {
    run_parallel("convert", paths, |path| {
        let mut font = open_font(path)?;
        font.set_flavor(to.flavor());
        let saved = output.save(&font)?;
        println!("  {} -> {}", path.display(), saved.display());
        Ok(())
    })
}

/// Print `source -> canonical name` for every font.
pub fn filenames(paths: &[PathBuf], options: &FilenameOptions) -> Result<()> {
    run_parallel("filename", paths, |path| {
        let font = open_font(path)?;
        println!("{} -> {}", path.display(), font.get_filename(options)?);
        Ok(())
    })
}
