// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON output matching Python's `json.dump` defaults
//!
//! Downstream consumers were written against files produced by `json.dump`, so
//! the separators (`", "` and `": "`) and float spellings (`1e-07`, `1e+16`,
//! `NaN`, `Infinity`) follow Python rather than serde_json's compact style.

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use std::io::{self, Write};
use std::path::Path;

/// serde_json formatter emitting Python `json.dumps` style output
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_f32<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f32) -> io::Result<()> {
        writer.write_all(python_float_repr(value as f64).as_bytes())
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(python_float_repr(value).as_bytes())
    }
}

/// Shortest round-trip spelling of a finite float, as Python's `repr` prints it.
///
/// Rust's `Debug` already picks the same digits and switches to exponent form at
/// the same thresholds; only the exponent needs an explicit sign and two digits.
pub fn python_float_repr(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

// serde_json writes newtype structs under this name as raw JSON text
const RAW_VALUE_TOKEN: &str = "$serde_json::private::RawValue";

/// Serialize a float the way `json.dump` does, including `NaN` and `Infinity`.
///
/// serde_json turns non-finite floats into `null`, so they are emitted as raw
/// text instead. Use with `#[serde(serialize_with = "...")]`.
pub fn serialize_python_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let spelling = if value.is_nan() {
        "NaN"
    } else if *value == f64::INFINITY {
        "Infinity"
    } else if *value == f64::NEG_INFINITY {
        "-Infinity"
    } else {
        return serializer.serialize_f64(*value);
    };
    serializer.serialize_newtype_struct(RAW_VALUE_TOKEN, spelling)
}

/// Serialize a value to Python-style JSON bytes
pub fn to_python_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, PythonFormatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The destination only ever holds a complete document; a failure leaves any
/// previous file untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
