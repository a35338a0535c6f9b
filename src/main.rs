mod codegen;
mod config;
mod device;
mod generator;
mod output;
mod util;

use std::io::prelude::*;
use std::path::{Path, PathBuf};
use clap::Parser;
use clap::AppSettings;
use anyhow::{bail, Context, Result};
use env_logger::fmt::Color;
use log::LevelFilter;

use config::Config;
use generator::run_generator;
use util::read_file_str;


#[macro_use]
extern crate log;

const OUTPUT_DIR: &str = "result";

/// Generate cpp_stm32 register headers from a vendor SVD file
#[derive(Parser, Debug)]
#[clap(
    global_setting(AppSettings::DeriveDisplayOrder)
)]
pub struct Args {
    /// Microcontroller vendor, e.g. STMicro
    vendor: String,

    /// Target microcontroller, e.g. STM32F446x
    target: String,

    /// Output directory. Defaults to result/<target>
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Format resulting files with clang-format
    #[clap(short, long)]
    format: bool,

    /// Directory holding <vendor>/<target>.svd. Overrides the config file
    #[clap(long)]
    svd_dir: Option<PathBuf>,

    /// YAML config file
    #[clap(short, long)]
    config: Option<String>,

    /// Verbosity. Can be repeated
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,
}


fn init_logging(level: u8) {
    let lf = match level {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(lf)
        .format(|buf, record| {
            let mut style = buf.style();
            let level = match record.level() {
                log::Level::Error => style.set_color(Color::Red).set_intense(true).value("ERROR"),
                log::Level::Warn =>  style.set_color(Color::Yellow).set_intense(true).value("WARN "),
                log::Level::Info =>  style.set_color(Color::Green).set_intense(true).value("INFO "),
                log::Level::Debug => style.set_color(Color::Cyan).set_intense(true).value("DEBUG"),
                log::Level::Trace => style.set_color(Color::Blue).set_intense(true).value("TRACE"),
            };

            writeln!(buf, "{} {}", level, record.args())
        })
        .init();
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => serde_yaml::from_str(&read_file_str(path)?)
            .with_context(|| format!("Failed to parse {}", path)),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;

    let svd_dir = args.svd_dir.clone().unwrap_or_else(|| PathBuf::from(&config.svd_dir));
    let device = device::svd::load(&svd_dir, &args.vendor, &args.target)?;

    let output_dir = args.output.clone()
        .unwrap_or_else(|| Path::new(OUTPUT_DIR).join(&args.target));

    let summary = run_generator(&config, &device, &output_dir, args.format)?;
    if !summary.failed.is_empty() {
        bail!("{} of {} peripheral groups failed: {}",
            summary.failed.len(), summary.failed.len() + summary.written.len(),
            summary.failed.join(", "));
    }

    info!("Done, {} headers written", summary.written.len());
    Ok(())
}
