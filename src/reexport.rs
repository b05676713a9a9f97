// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OBJ mesh reexport

use crate::config::MeshConfig;
use crate::io;
use anyhow::Result;
use std::path::PathBuf;

/// Outcome of a successful reexport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReexportSummary {
    pub output: PathBuf,
    pub vertex_count: usize,
    pub face_count: usize,
}

/// Read the configured OBJ file and write its vertices and faces back out.
///
/// Errors from reading, parsing or writing are returned unchanged; the output
/// file is not touched when the input cannot be loaded.
pub fn reexport(config: &MeshConfig) -> Result<ReexportSummary> {
    let mesh = io::load_obj(&config.input)?;
    let faces = &mesh.faces.verts_idx;

    io::save_obj(&config.output, &mesh.verts, faces, config.decimal_places)?;
    log::info!(
        "reexported {} vertices and {} faces to {}",
        mesh.vertex_count(),
        faces.len(),
        config.output.display()
    );

    Ok(ReexportSummary {
        output: config.output.clone(),
        vertex_count: mesh.vertex_count(),
        face_count: faces.len(),
    })
}
