//! Command-line converter for legacy dashboard grids.
//!
//! Reads a legacy positions JSON file, converts it to the nested layout
//! tree, and writes the tree (or the reconstructed render positions) as
//! JSON to stdout or a file. Already-converted layout files can be fed
//! back in to regenerate positions.

use anyhow::Result;
use std::env;

use dashgrid::{
    convert_to_layout, convert_to_positions, layout_to_json, load_layout, load_positions,
    positions_to_json, save_layout, save_positions,
};

struct Config {
    input: String,
    from_layout: bool,
    emit_positions: bool,
    output_file: Option<String>,
}

fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let mut input = None;
    let mut from_layout = false;
    let mut emit_positions = false;
    let mut output_file = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-layout" => {
                from_layout = true;
            }
            "-positions" => {
                emit_positions = true;
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
            arg if arg.starts_with('-') => {
                eprintln!("Warning: Unknown argument: {arg}");
            }
            arg => {
                if input.is_some() {
                    anyhow::bail!("Only one input file may be given");
                }
                input = Some(arg.to_string());
            }
        }
        i += 1;
    }

    let Some(input) = input else {
        print_help();
        anyhow::bail!("No input file given");
    };
    Ok(Config {
        input,
        from_layout,
        emit_positions,
        output_file,
    })
}

fn print_help() {
    println!("Dashboard Layout Converter");
    println!("Usage: dash-convert [OPTIONS] <input.json>");
    println!();
    println!("OPTIONS:");
    println!("  -layout                Input is an already-converted layout tree");
    println!("                         (default: legacy positions array)");
    println!("  -positions             Emit reconstructed render positions instead");
    println!("                         of the layout tree");
    println!("  -out <FILE>            Write output to FILE (default: stdout)");
    println!("  -h, -help              Show this help");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = parse_args()?;

    let tree = if config.from_layout {
        load_layout(&config.input)?
    } else {
        let rects = load_positions(&config.input)?;
        convert_to_layout(&rects)?
    };

    if config.emit_positions {
        let positions = convert_to_positions(&tree)?;
        match &config.output_file {
            Some(path) => save_positions(path, &positions)?,
            None => println!("{}", positions_to_json(&positions)?),
        }
    } else {
        match &config.output_file {
            Some(path) => save_layout(path, &tree)?,
            None => println!("{}", layout_to_json(&tree)?),
        }
    }
    Ok(())
}
