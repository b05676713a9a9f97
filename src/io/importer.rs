// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OBJ file importer

use super::ObjError;
use crate::geometry::ObjMesh;
use anyhow::{Context, Result};
use nalgebra::{Point2, Point3, Vector3};
use std::fs;
use std::path::Path;

/// Import a .obj file into a triangle mesh
pub fn load_obj(path: impl AsRef<Path>) -> Result<ObjMesh> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read OBJ file: {}", path.display()))?;

    parse_obj(&source).with_context(|| format!("Failed to parse OBJ file: {}", path.display()))
}

/// One `v/vt/vn` corner of a face line, indices as written
#[derive(Debug, Clone, Copy, PartialEq)]
struct Corner {
    vertex: i64,
    texture: Option<i64>,
    normal: Option<i64>,
}

struct FaceLine {
    line: usize,
    corners: Vec<Corner>,
    material: Option<usize>,
}

/// Parse OBJ source text.
///
/// Polygons are fan-triangulated from their first corner. Negative indices
/// count back from the end of the list over the whole file.
pub fn parse_obj(source: &str) -> Result<ObjMesh, ObjError> {
    let mut mesh = ObjMesh::new();
    let mut face_lines = Vec::new();
    let mut material = None;

    for (number, text) in source.lines().enumerate() {
        let line = number + 1;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some((keyword, args)) = tokens.split_first() else {
            continue;
        };

        match *keyword {
            "v" => {
                let [x, y, z] = parse_floats(line, "Vertex", args)?;
                mesh.verts.push(Point3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_floats(line, "Normal", args)?;
                mesh.aux.normals.push(Vector3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats(line, "Texture", args)?;
                mesh.aux.verts_uvs.push(Point2::new(u, v));
            }
            "f" => {
                let corners = args
                    .iter()
                    .map(|token| parse_corner(line, token))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(ObjError::parse(line, "Face has fewer than 3 vertices"));
                }
                face_lines.push(FaceLine {
                    line,
                    corners,
                    material,
                });
            }
            "usemtl" => {
                material = args.first().map(|name| mesh.aux.material_index(name));
            }
            "mtllib" => {
                mesh.aux.mtllibs.extend(args.iter().map(|name| name.to_string()));
            }
            _ => {}
        }
    }

    let vertex_count = mesh.verts.len();
    let texture_count = mesh.aux.verts_uvs.len();
    let normal_count = mesh.aux.normals.len();

    for face in &face_lines {
        let verts = face
            .corners
            .iter()
            .map(|c| resolve_index(face.line, "vertex", c.vertex, vertex_count))
            .collect::<Result<Vec<_>, _>>()?;
        let textures = resolve_optional(face, |c| c.texture, "texture", texture_count)?;
        let normals = resolve_optional(face, |c| c.normal, "normal", normal_count)?;

        for i in 1..verts.len() - 1 {
            let fan = |idx: &Vec<usize>| [idx[0], idx[i], idx[i + 1]];
            mesh.faces.push(
                fan(&verts),
                normals.as_ref().map(fan),
                textures.as_ref().map(fan),
                face.material,
            );
        }
    }

    Ok(mesh)
}

fn parse_floats<const N: usize>(line: usize, what: &str, args: &[&str]) -> Result<[f32; N], ObjError> {
    if args.len() < N {
        return Err(ObjError::parse(
            line,
            format!("{} does not have {} values", what, N),
        ));
    }

    let mut values = [0.0f32; N];
    for (slot, token) in values.iter_mut().zip(args) {
        *slot = token
            .parse()
            .map_err(|_| ObjError::parse(line, format!("could not convert '{}' to float", token)))?;
    }
    Ok(values)
}

fn parse_corner(line: usize, token: &str) -> Result<Corner, ObjError> {
    let mut parts = token.split('/');
    let vertex = parse_index(line, parts.next().unwrap_or_default())?;
    let texture = match parts.next() {
        None | Some("") => None,
        Some(part) => Some(parse_index(line, part)?),
    };
    let normal = match parts.next() {
        None | Some("") => None,
        Some(part) => Some(parse_index(line, part)?),
    };

    Ok(Corner {
        vertex,
        texture,
        normal,
    })
}

fn parse_index(line: usize, token: &str) -> Result<i64, ObjError> {
    token
        .parse()
        .map_err(|_| ObjError::parse(line, format!("invalid face index '{}'", token)))
}

/// Convert a 1-based or negative OBJ index to a 0-based one
fn resolve_index(line: usize, what: &str, raw: i64, count: usize) -> Result<usize, ObjError> {
    let resolved = match raw {
        r if r > 0 => r - 1,
        r if r < 0 => r + count as i64,
        _ => -1,
    };

    if resolved < 0 || resolved as usize >= count {
        return Err(ObjError::parse(
            line,
            format!("{} index {} is out of range ({} defined)", what, raw, count),
        ));
    }
    Ok(resolved as usize)
}

/// Resolve texture or normal indices; `None` unless every corner has one
fn resolve_optional(
    face: &FaceLine,
    pick: impl Fn(&Corner) -> Option<i64>,
    what: &str,
    count: usize,
) -> Result<Option<Vec<usize>>, ObjError> {
    let raw: Option<Vec<i64>> = face.corners.iter().map(&pick).collect();
    match raw {
        Some(raw) => raw
            .into_iter()
            .map(|r| resolve_index(face.line, what, r, count))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        None => Ok(None),
    }
}
