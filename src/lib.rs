// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! GSVerse asset tools
//!
//! Two small preparation steps for the splat/mesh pipeline:
//! exporting the `_alpha` and `_scale` parameters of a trained checkpoint to
//! JSON, and re-saving an OBJ mesh with plain vertex/face records.

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod geometry;
pub mod io;
pub mod params;
pub mod reexport;

pub use checkpoint::{load_checkpoint, Checkpoint, CheckpointValue};
pub use config::{MeshConfig, ParamsConfig, ToolsConfig};
pub use geometry::ObjMesh;
pub use io::{load_obj, save_obj};
pub use params::{ExportError, ParamExporter, ParamRecord};
pub use reexport::{reexport, ReexportSummary};

/// Export `_alpha` and `_scale` with the given settings
pub fn export(config: &ParamsConfig) -> Result<params::ExportSummary, ExportError> {
    ParamExporter::new(config.clone()).export()
}
