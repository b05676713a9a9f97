// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Checkpoint parameter exporter

use super::{ExportError, NestedList};
use crate::checkpoint::{load_checkpoint, Checkpoint, CheckpointValue};
use crate::config::ParamsConfig;
use crate::io;
use candle_core::Tensor;
use serde::Serialize;
use std::path::PathBuf;

pub const ALPHA_KEY: &str = "_alpha";
pub const SCALE_KEY: &str = "_scale";

/// The JSON document written by the exporter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamRecord {
    #[serde(rename = "_alpha")]
    pub alpha: NestedList,
    #[serde(rename = "_scale")]
    pub scale: NestedList,
}

impl ParamRecord {
    /// Extract, validate and convert both parameters
    pub fn from_checkpoint(checkpoint: &Checkpoint) -> Result<Self, ExportError> {
        let (alpha, scale) = match (lookup(checkpoint, ALPHA_KEY), lookup(checkpoint, SCALE_KEY)) {
            (Some(alpha), Some(scale)) => (alpha, scale),
            _ => return Err(ExportError::MissingKey),
        };

        let (alpha, scale) = match (
            alpha.unwrap_singleton().as_array(),
            scale.unwrap_singleton().as_array(),
        ) {
            (Some(alpha), Some(scale)) => (alpha, scale),
            _ => return Err(ExportError::TypeMismatch),
        };

        Ok(Self {
            alpha: convert(ALPHA_KEY, alpha)?,
            scale: convert(SCALE_KEY, scale)?,
        })
    }

    /// Serialize as `json.dump` would
    pub fn to_json(&self) -> Result<Vec<u8>, ExportError> {
        io::to_python_json(self).map_err(|e| ExportError::Other(e.into()))
    }
}

fn lookup<'a>(checkpoint: &'a Checkpoint, key: &str) -> Option<&'a CheckpointValue> {
    checkpoint.get(key).filter(|value| !value.is_none())
}

fn convert(key: &str, tensor: &Tensor) -> Result<NestedList, ExportError> {
    NestedList::from_tensor(tensor)
        .map_err(|e| ExportError::Other(e.context(format!("failed to convert '{}'", key))))
}

/// Outcome of a successful export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub alpha_values: usize,
    pub scale_values: usize,
    pub bytes_written: usize,
}

/// Exports `_alpha` and `_scale` from a checkpoint to JSON
pub struct ParamExporter {
    config: ParamsConfig,
}

impl ParamExporter {
    pub fn new(config: ParamsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParamsConfig {
        &self.config
    }

    /// Load the configured checkpoint
    pub fn load(&self) -> Result<Checkpoint, ExportError> {
        let checkpoint = load_checkpoint(&self.config.input, self.config.state_key.as_deref())?;
        log::debug!(
            "loaded {} entries from {}",
            checkpoint.len(),
            self.config.input.display()
        );
        Ok(checkpoint)
    }

    /// Convert an already loaded checkpoint and write the JSON output.
    ///
    /// Nothing is written unless extraction and conversion succeed.
    pub fn export_checkpoint(&self, checkpoint: &Checkpoint) -> Result<ExportSummary, ExportError> {
        let record = ParamRecord::from_checkpoint(checkpoint)?;
        let json = record.to_json()?;

        io::write_atomic(&self.config.output, &json).map_err(ExportError::Other)?;
        log::info!(
            "wrote {} bytes to {}",
            json.len(),
            self.config.output.display()
        );

        Ok(ExportSummary {
            output: self.config.output.clone(),
            alpha_values: record.alpha.leaf_count(),
            scale_values: record.scale.leaf_count(),
            bytes_written: json.len(),
        })
    }

    /// Load, convert and write in one step
    pub fn export(&self) -> Result<ExportSummary, ExportError> {
        let checkpoint = self.load()?;
        self.export_checkpoint(&checkpoint)
    }
}
