// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation as read from OBJ files

use nalgebra::{Point2, Point3, Vector3};

/// Per-face properties, all indices 0-based
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceProps {
    /// Vertex indices of each triangle
    pub verts_idx: Vec<[usize; 3]>,
    /// Normal indices, when every corner of the face named one
    pub normals_idx: Vec<Option<[usize; 3]>>,
    /// Texture coordinate indices, when every corner of the face named one
    pub textures_idx: Vec<Option<[usize; 3]>>,
    /// Index into [`AuxProps::material_names`] active for the face
    pub materials_idx: Vec<Option<usize>>,
}

impl FaceProps {
    pub fn push(
        &mut self,
        verts: [usize; 3],
        normals: Option<[usize; 3]>,
        textures: Option<[usize; 3]>,
        material: Option<usize>,
    ) {
        self.verts_idx.push(verts);
        self.normals_idx.push(normals);
        self.textures_idx.push(textures);
        self.materials_idx.push(material);
    }

    pub fn len(&self) -> usize {
        self.verts_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verts_idx.is_empty()
    }
}

/// Auxiliary data carried alongside the geometry but never interpreted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxProps {
    pub normals: Vec<Vector3<f32>>,
    pub verts_uvs: Vec<Point2<f32>>,
    /// Material names in order of first `usemtl`
    pub material_names: Vec<String>,
    /// Material libraries named by `mtllib`
    pub mtllibs: Vec<String>,
}

impl AuxProps {
    /// Index of a material name, registering it on first use
    pub fn material_index(&mut self, name: &str) -> usize {
        match self.material_names.iter().position(|m| m == name) {
            Some(index) => index,
            None => {
                self.material_names.push(name.to_owned());
                self.material_names.len() - 1
            }
        }
    }
}

/// Triangle mesh loaded from an OBJ file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjMesh {
    pub verts: Vec<Point3<f32>>,
    pub faces: FaceProps,
    pub aux: AuxProps,
}

impl ObjMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    /// Get face count
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}
