// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};
use anyhow::{Context as _, Result};

use crate::codegen::Emitter;
use crate::codegen::address::{group_peripherals, PeripheralGroup};
use crate::config::Config;
use crate::device::Device;
use crate::output::{self, Formatter};

#[derive(Debug, Default)]
pub struct Summary {
    pub written: Vec<PathBuf>,
    /// Group names whose header could not be produced
    pub failed: Vec<String>,
}

fn generate_group(emitter: &Emitter, group: &PeripheralGroup, output_dir: &Path) -> Result<PathBuf> {
    for p in &group.instances {
        p.validate()?;
    }

    let content = emitter.render(group)
        .with_context(|| format!("Failed to render {}", group.name))?;
    output::write_header(output_dir, &emitter.file_name(group), &content)
}

/// Writes one header per peripheral group of `device` into `output_dir`.
///
/// A group that fails does not stop the others, it is reported in the summary.
pub fn run_generator(config: &Config, device: &Device, output_dir: &Path, format: bool) -> Result<Summary> {
    info!("Generating headers for device={} cpu={} into {}",
        device.name, device.cpu.as_deref().unwrap_or("unknown"), output_dir.display());

    output::create_output_dir(output_dir)?;

    let emitter = Emitter::new(&config.output);
    let formatter = Formatter::new(&config.formatter);
    let mut summary = Summary::default();

    for group in group_peripherals(&device.peripherals) {
        debug!("Peripheral group={} instances={} registers={}",
            group.name, group.instances.len(), group.layout().registers.len());

        match generate_group(&emitter, &group, output_dir) {
            Ok(path) => {
                info!("Wrote {}", path.display());
                if format {
                    if let Err(e) = formatter.run(&path) {
                        warn!("Leaving {} unformatted: {:#}", path.display(), e);
                    }
                }
                summary.written.push(path);
            }
            Err(e) => {
                error!("Skipping group={}: {:#}", group.name, e);
                summary.failed.push(group.name.clone());
            }
        }
    }

    Ok(summary)
}
