// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Export `_alpha` and `_scale` from a PyTorch checkpoint to JSON

use anyhow::Result;
use clap::Parser;
use gsverse_tools::cli::Reporter;
use gsverse_tools::{ExportError, ParamExporter, ParamsConfig, ToolsConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "import-params")]
#[command(about = "Export _alpha and _scale from a PyTorch checkpoint to JSON", long_about = None)]
struct Cli {
    /// Checkpoint file [default: model_params.pt]
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output JSON file [default: model_params.json]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Read the parameters from this nested dict of the checkpoint
    #[arg(long, value_name = "KEY")]
    state_key: Option<String>,

    /// Configuration file [default: gsverse.toml when present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = params_config(cli)
        .map_err(ExportError::Other)
        .and_then(|config| {
            let exporter = ParamExporter::new(config);
            let checkpoint = exporter.load()?;
            Reporter::report_info("Model weights loaded successfully.");
            exporter.export_checkpoint(&checkpoint)
        });

    match result {
        Ok(summary) => Reporter::report_saved(&summary.output),
        Err(e) => {
            Reporter::report_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Defaults, then config file and environment, then flags
fn params_config(cli: Cli) -> Result<ParamsConfig> {
    let mut config = ToolsConfig::load_params(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        config.input = input;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(key) = cli.state_key {
        config.state_key = Some(key);
    }
    Ok(config)
}
