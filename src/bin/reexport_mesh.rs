// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Re-save an OBJ mesh with plain vertex and face records

use anyhow::Result;
use clap::Parser;
use gsverse_tools::{reexport, ToolsConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reexport-mesh")]
#[command(about = "Re-save an OBJ mesh with vertices and faces only", long_about = None)]
struct Cli {
    /// Input OBJ file [default: mesh.obj]
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output OBJ file [default: mesh_pytorch3D.obj]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Digits after the decimal point for vertex coordinates [default: 6]
    #[arg(short, long, value_name = "N")]
    decimal_places: Option<usize>,

    /// Configuration file [default: gsverse.toml when present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = ToolsConfig::load_mesh(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        config.input = input;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if cli.decimal_places.is_some() {
        config.decimal_places = cli.decimal_places;
    }

    reexport(&config)?;

    Ok(())
}
