//! Synthetic legacy grid generator.
//!
//! Produces a random but reproducible legacy positions file for testing
//! and demoing the converter pipeline.

use anyhow::{Context, Result};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

use dashgrid::{generate_virtual_grid, VirtualGridConfig};

struct Config {
    grid: VirtualGridConfig,
    output_file: Option<String>,
}

fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let mut grid = VirtualGridConfig::default();
    let mut output_file = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-bands" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-bands requires an argument");
                }
                grid.bands = args[i].parse()?;
            }
            "-max_per_band" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-max_per_band requires an argument");
                }
                grid.max_charts_per_band = args[i].parse()?;
            }
            "-seed" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-seed requires an argument");
                }
                grid.seed = args[i].parse()?;
            }
            "-out" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-out requires a file path argument");
                }
                output_file = Some(args[i].clone());
            }
            "-h" | "-help" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Warning: Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    Ok(Config { grid, output_file })
}

fn print_help() {
    println!("Legacy Dashboard Grid Generator");
    println!("Usage: dash-gridgen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -bands <N>             Number of horizontal bands (default: 4)");
    println!("  -max_per_band <N>      Maximum charts per band (default: 4)");
    println!("  -seed <N>              RNG seed for reproducible output (default: 42)");
    println!("  -out <FILE>            Write output to FILE (default: stdout)");
    println!("  -h, -help              Show this help");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = parse_args()?;
    let rects = generate_virtual_grid(&config.grid);
    let json = serde_json::to_string_pretty(&rects).context("Failed to serialize grid")?;

    match &config.output_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create file: {path}"))?;
            let mut writer = BufWriter::new(file);
            writeln!(writer, "{json}").context("Failed to write output")?;
            writer.flush().context("Failed to flush writer")?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
