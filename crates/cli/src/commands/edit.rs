use std::path::PathBuf;

use anyhow::{Result, bail};
use fonthandle::{NameKey, StyleFlag, StyleFlags};

use crate::{
    io::{OutputArgs, open_font},
    parallel::run_parallel,
};

pub fn set_names(
    paths: &[PathBuf],
    names: &[(NameKey, String)],
    delete: &[NameKey],
    output: &OutputArgs,
) -> Result<()> {
    if names.is_empty() && delete.is_empty() {
        bail!("Nothing to do, pass --name KEY=VALUE or --delete KEY");
    }
    run_parallel("set-name", paths, |path| {
        let mut font = open_font(path)?;
        font.set_names(names.iter().cloned())?;
        for key in delete {
            font.delete_name(key.clone())?;
        }
        let saved = output.save(&font)?;
        println!("  {} -> {}", path.display(), saved.display());
        Ok(())
    })
}

pub fn rename(
    paths: &[PathBuf],
    family: Option<&str>,
    style: Option<&str>,
    update_style_flags: bool,
    output: &OutputArgs,
) -> Result<()> {
    if family.is_none() && style.is_none() {
        bail!("Nothing to do, pass --family and/or --style");
    }
    run_parallel("rename", paths, |path| {
        let mut font = open_font(path)?;
        font.rename(family, style, update_style_flags)?;
        let saved = output.save(&font)?;
        println!(
            "  {} -> {} ({})",
            path.display(),
            saved.display(),
            font.get_name("full_name")?.unwrap_or_default()
        );
        Ok(())
    })
}

/// How `set-style-flags` changes a font.
#[derive(Debug, Clone)]
pub enum FlagChange {
    Set { on: Vec<StyleFlag>, off: Vec<StyleFlag> },
    FromSubfamily,
}

impl FlagChange {
    fn flags(&self) -> StyleFlags {
        let mut flags = StyleFlags::default();
        if let FlagChange::Set { on, off } = self {
            for flag in on {
                flags.set(*flag, Some(true));
            }
            for flag in off {
                flags.set(*flag, Some(false));
            }
        }
        flags
    }
}

pub fn set_style_flags(paths: &[PathBuf], change: &FlagChange, output: &OutputArgs) -> Result<()> {
    let flags = change.flags();
    if flags == StyleFlags::default() && !matches!(change, FlagChange::FromSubfamily) {
        bail!("Nothing to do, pass --on, --off or --from-subfamily");
    }
    run_parallel("set-style-flags", paths, |path| {
        let mut font = open_font(path)?;
        match change {
            FlagChange::FromSubfamily => font.set_style_flags_by_subfamily_name()?,
            FlagChange::Set { .. } => font.set_style_flags(flags)?,
        }
        let saved = output.save(&font)?;
        println!("  {} -> {}", path.display(), saved.display());
        Ok(())
    })
}
