// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - OBJ importing and exporting, JSON writing

mod exporter;
mod importer;
mod json;
mod obj_error;

pub use exporter::{format_obj, save_obj, DEFAULT_DECIMAL_PLACES};
pub use importer::{load_obj, parse_obj};
pub use json::{
    python_float_repr, serialize_python_float, to_python_json, write_atomic, PythonFormatter,
};
pub use obj_error::ObjError;
