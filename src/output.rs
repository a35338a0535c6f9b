// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::config::FormatterConfig;

pub fn create_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

/// Creates or truncates `dir/file_name` with `content`.
pub fn write_header(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// External code formatter run in place on generated files.
pub struct Formatter<'a> {
    config: &'a FormatterConfig,
}

impl<'a> Formatter<'a> {
    pub fn new(config: &'a FormatterConfig) -> Self {
        Self { config }
    }

    /// Runs the formatter on `path`. The file is only ever modified by the tool itself.
    pub fn run(&self, path: &Path) -> Result<()> {
        let status = Command::new(&self.config.command)
            .args(&self.config.args)
            .arg(path)
            .status()
            .with_context(|| format!("Failed to run {}", self.config.command))?;

        if !status.success() {
            bail!("{} exited with {} on {}", self.config.command, status, path.display());
        }

        Ok(())
    }
}
