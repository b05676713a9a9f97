// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OBJ mesh exporter

use super::ObjError;
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs;
use std::path::Path;

/// Digits after the decimal point when none are requested (`%f`)
pub const DEFAULT_DECIMAL_PLACES: usize = 6;

/// Export vertices and triangle faces to an OBJ file.
///
/// Texture coordinates, normals and materials are not written. The file is
/// only created once every face index has been checked against `verts`.
pub fn save_obj(
    path: impl AsRef<Path>,
    verts: &[Point3<f32>],
    faces: &[[usize; 3]],
    decimal_places: Option<usize>,
) -> Result<()> {
    let path = path.as_ref();
    let contents = format_obj(verts, faces, decimal_places)?;

    fs::write(path, contents)
        .with_context(|| format!("Failed to write OBJ file: {}", path.display()))
}

/// Render OBJ text: `v` lines, then 1-based `f` lines, no newline after the last face
pub fn format_obj(
    verts: &[Point3<f32>],
    faces: &[[usize; 3]],
    decimal_places: Option<usize>,
) -> Result<String, ObjError> {
    for (face, indices) in faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i >= verts.len()) {
            return Err(ObjError::InvalidFaceIndex {
                face,
                index,
                count: verts.len(),
            });
        }
    }

    let places = decimal_places.unwrap_or(DEFAULT_DECIMAL_PLACES);
    let mut out = String::new();

    for vert in verts {
        out.push_str(&format!(
            "v {} {} {}\n",
            format_coord(vert.x, places),
            format_coord(vert.y, places),
            format_coord(vert.z, places)
        ));
    }

    for (i, face) in faces.iter().enumerate() {
        out.push_str(&format!("f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1));
        if i + 1 < faces.len() {
            out.push('\n');
        }
    }

    Ok(out)
}

/// printf-style fixed notation, including its spelling of non-finite values
fn format_coord(value: f32, places: usize) -> String {
    let value = value as f64;
    if value.is_nan() {
        "nan".to_owned()
    } else if value == f64::INFINITY {
        "inf".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_owned()
    } else {
        format!("{:.*}", places, value)
    }
}
