//! Input expansion and saving.

use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use fonthandle::{FilenameOptions, FontHandle, SaveOptions};
use glob::glob;

/// Where modified fonts are written.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct OutputArgs {
    /// Write into this directory instead of replacing the input files.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Name output files after their PostScript name or variable axes.
    #[arg(long)]
    pub auto_name: bool,
}

impl OutputArgs {
    /// Save `font`, returning the path written.
    pub fn save(&self, font: &FontHandle) -> Result<PathBuf> {
        let dir = match &self.output_dir {
            Some(dir) => {
                ensure_dir(dir)?;
                Some(dir.clone())
            }
            None => None,
        };

        let target = if self.auto_name {
            let name = font.get_filename(&FilenameOptions::default())?;
            let dir = dir
                .or_else(|| font.path().and_then(Path::parent).map(Path::to_path_buf))
                .unwrap_or_default();
            Some(dir.join(name))
        } else {
            dir
        };

        let options = SaveOptions::overwrite(self.output_dir.is_none());
        font.save(target.as_deref(), options)
            .with_context(|| format!("Failed to save {font}"))
    }
}

/// Open a font file, with the path in the error.
pub fn open_font(path: &Path) -> Result<FontHandle> {
    FontHandle::from_path(path).with_context(|| format!("Failed to open font: {}", path.display()))
}

/// Expand paths and glob patterns into font files.
///
/// Plain paths are kept as given so a missing file is reported when it is
/// opened. A pattern that matches nothing is an error.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(input));
            continue;
        }
        let matched: Vec<PathBuf> = glob(input)
            .with_context(|| format!("Failed to glob pattern: {input}"))?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .collect();
        if matched.is_empty() {
            bail!("No fonts match {input}");
        }
        paths.extend(matched);
    }
    paths.dedup();
    Ok(paths)
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))
}
