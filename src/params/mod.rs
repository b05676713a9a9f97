// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parameter export - `_alpha` and `_scale` from a checkpoint to JSON

mod error;
mod exporter;
mod nested;

pub use error::ExportError;
pub use exporter::{ExportSummary, ParamExporter, ParamRecord, ALPHA_KEY, SCALE_KEY};
pub use nested::NestedList;
