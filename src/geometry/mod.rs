// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation

mod mesh;

pub use mesh::{AuxProps, FaceProps, ObjMesh};
