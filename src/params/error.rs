// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::checkpoint::LoadError;
use thiserror::Error;

/// Why a parameter export stopped before writing its output
#[derive(Debug, Error)]
pub enum ExportError {
    /// `_alpha` or `_scale` is absent (or stored as `None`)
    #[error("Missing '_alpha' or '_scale' in model parameters")]
    MissingKey,

    /// A value is not a tensor once single-element lists are unwrapped
    #[error("Both '_alpha' and '_scale' must be torch tensors or lists of tensors")]
    TypeMismatch,

    /// The checkpoint could not be opened or decoded
    #[error(transparent)]
    LoadFailure(#[from] LoadError),

    /// Conversion or output failures
    #[error("{0:#}")]
    Other(anyhow::Error),
}
