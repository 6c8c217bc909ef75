//! unistrap
//!
//! Usage:
//!   unistrap -b path/to/bootstrap.bin -k path/to/kernel.bin [-o kernel.img]

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use unistrap::cli::{self, UsageError};
use unistrap::{BuildReport, ImageBuilder, ImageConfig};

fn run(config: ImageConfig) -> Result<BuildReport> {
    log::info!("═══════════════════════════════════════════════════════════");
    log::info!("  Unistrap v{}", cli::VERSION);
    log::info!("═══════════════════════════════════════════════════════════");
    log::info!("Configuration:");
    log::info!("  Bootstrap: {}", config.bootstrap.display());
    log::info!("  Kernel:    {}", config.kernel.display());
    log::info!("  Output:    {}", config.output.display());

    let builder = ImageBuilder::new(config);
    let report = builder
        .build()
        .with_context(|| format!("Failed to build {}", builder.config().output.display()))?;

    let hdr = &report.header;
    log::info!("Image layout:");
    log::info!("  Bootstrap: {:#x} ({} bytes)", hdr.bootstrap_offset, hdr.bootstrap_size);
    log::info!("  Kernel:    {:#x} ({} bytes)", hdr.kernel_offset, hdr.kernel_size);
    log::info!("  Sectors:   {}", hdr.sector_count);
    log::info!(
        "[*] Wrote {} bytes, padded to {} bytes",
        report.bytes_written,
        report.padding
    );

    Ok(report)
}

fn report_usage(err: &UsageError) {
    match err {
        UsageError::VersionRequested => println!("{}", cli::version_banner()),
        UsageError::Parse(msg) => eprintln!("{}", msg),
        _ => {
            if err.is_fatal() {
                eprintln!("{} {}", "fatal:".red().bold(), err);
            }
            println!("{}", cli::usage());
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match cli::parse_args(std::env::args_os()) {
        Ok(config) => config,
        Err(err) => {
            report_usage(&err);
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "fatal:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
