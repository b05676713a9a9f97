// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use thiserror::Error;

/// OBJ parse and write errors
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("face {face} references vertex {index} but the mesh has {count} vertices")]
    InvalidFaceIndex {
        face: usize,
        index: usize,
        count: usize,
    },
}

impl ObjError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ObjError::Parse {
            line,
            message: message.into(),
        }
    }
}
