// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Round-trip OBJ reexport tests

use anyhow::Result;
use approx::assert_relative_eq;
use gsverse_tools::{load_obj, reexport, MeshConfig};
use std::path::Path;
use tempfile::TempDir;

const TETRAHEDRON: &str = "\
# tetrahedron with uv and normal data
mtllib tetra.mtl
o tetra
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 -1.0
usemtl stone
s off
f 1/1/1 3/3/1 2/2/1
f 1/1 2/2 4/3
f 1//1 4//1 3//1
f 2 3 4
";

fn config(dir: &Path) -> MeshConfig {
    MeshConfig {
        input: dir.join("mesh.obj"),
        output: dir.join("mesh_pytorch3D.obj"),
        decimal_places: None,
    }
}

#[test]
fn test_reexport_preserves_vertices_and_faces() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config(dir.path());
    std::fs::write(&config.input, TETRAHEDRON)?;

    let original = load_obj(&config.input)?;
    let summary = reexport(&config)?;
    assert_eq!(summary.vertex_count, 4);
    assert_eq!(summary.face_count, 4);

    let reloaded = load_obj(&config.output)?;
    assert_eq!(reloaded.vertex_count(), original.vertex_count());
    assert_eq!(reloaded.face_count(), original.face_count());
    assert_eq!(reloaded.faces.verts_idx, original.faces.verts_idx);
    for (a, b) in original.verts.iter().zip(&reloaded.verts) {
        assert_relative_eq!(*a, *b, epsilon = 1e-6);
    }

    // texture, normal and material data are not written back
    assert!(reloaded.aux.verts_uvs.is_empty());
    assert!(reloaded.aux.normals.is_empty());
    assert!(reloaded.aux.mtllibs.is_empty());

    Ok(())
}

#[test]
fn test_reexported_file_layout() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config(dir.path());
    std::fs::write(&config.input, TETRAHEDRON)?;

    reexport(&config)?;

    let text = std::fs::read_to_string(&config.output)?;
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "v 0.000000 0.000000 0.000000");
    assert_eq!(lines[4], "f 1 3 2");
    assert_eq!(lines[7], "f 2 3 4");
    assert!(!text.ends_with('\n'));

    Ok(())
}

#[test]
fn test_second_reexport_is_stable() -> Result<()> {
    let dir = TempDir::new()?;
    let first = config(dir.path());
    std::fs::write(&first.input, TETRAHEDRON)?;
    reexport(&first)?;

    let second = MeshConfig {
        input: first.output.clone(),
        output: dir.path().join("again.obj"),
        decimal_places: None,
    };
    reexport(&second)?;

    assert_eq!(
        std::fs::read_to_string(&first.output)?,
        std::fs::read_to_string(&second.output)?
    );
    Ok(())
}

#[test]
fn test_polygons_are_triangulated() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config(dir.path());
    std::fs::write(
        &config.input,
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0.5 1.5 0\nv 0 1 0\nf 1 2 3 4 5\n",
    )?;

    let summary = reexport(&config)?;
    assert_eq!(summary.face_count, 3);

    let reloaded = load_obj(&config.output)?;
    assert_eq!(reloaded.faces.verts_idx, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    Ok(())
}

#[test]
fn test_decimal_places() -> Result<()> {
    let dir = TempDir::new()?;
    let config = MeshConfig {
        decimal_places: Some(3),
        ..config(dir.path())
    };
    std::fs::write(&config.input, "v 0.12345 1 -2\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")?;

    reexport(&config)?;
    let text = std::fs::read_to_string(&config.output)?;
    assert!(text.starts_with("v 0.123 1.000 -2.000\n"));
    Ok(())
}

#[test]
fn test_missing_input_propagates_error() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config(dir.path());

    let err = reexport(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("mesh.obj"));
    assert!(!config.output.exists());
    Ok(())
}

#[test]
fn test_malformed_input_propagates_error() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config(dir.path());
    std::fs::write(&config.input, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 7\n")?;

    let err = reexport(&config).unwrap_err();
    assert!(format!("{:#}", err).contains("line 4"));
    assert!(!config.output.exists());
    Ok(())
}
