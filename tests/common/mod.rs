// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Writes small checkpoints in the `torch.save` zip layout

#![allow(dead_code)]

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

/// A Python value as `torch.save` would pickle it
#[derive(Debug, Clone)]
pub enum PyValue {
    Tensor {
        storage_type: &'static str,
        key: String,
        numel: usize,
        offset: usize,
        shape: Vec<usize>,
        stride: Vec<usize>,
        parameter: bool,
    },
    List(Vec<PyValue>),
    Tuple(Vec<PyValue>),
    Dict(Vec<(String, PyValue)>),
    Int(i32),
    Float(f64),
    Str(String),
    None,
}

impl PyValue {
    /// Wrap a tensor as `nn.Parameter`
    pub fn into_parameter(self) -> PyValue {
        match self {
            PyValue::Tensor {
                storage_type,
                key,
                numel,
                offset,
                shape,
                stride,
                ..
            } => PyValue::Tensor {
                storage_type,
                key,
                numel,
                offset,
                shape,
                stride,
                parameter: true,
            },
            other => other,
        }
    }
}

/// Builds a checkpoint archive entry by entry
#[derive(Default)]
pub struct CheckpointBuilder {
    entries: Vec<(String, PyValue)>,
    storages: Vec<(String, Vec<u8>)>,
}

fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for dim in (0..shape.len().saturating_sub(1)).rev() {
        strides[dim] = strides[dim + 1] * shape[dim + 1];
    }
    strides
}

impl CheckpointBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_storage(&mut self, bytes: Vec<u8>) -> String {
        let key = self.storages.len().to_string();
        self.storages.push((key.clone(), bytes));
        key
    }

    /// Contiguous float32 tensor
    pub fn f32_tensor(&mut self, values: &[f32], shape: &[usize]) -> PyValue {
        self.strided_f32_tensor(values, shape, &contiguous_strides(shape), 0)
    }

    /// Float32 view over `storage` with explicit strides and offset
    pub fn strided_f32_tensor(
        &mut self,
        storage: &[f32],
        shape: &[usize],
        stride: &[usize],
        offset: usize,
    ) -> PyValue {
        let bytes = storage.iter().flat_map(|v| v.to_le_bytes()).collect();
        PyValue::Tensor {
            storage_type: "FloatStorage",
            key: self.add_storage(bytes),
            numel: storage.len(),
            offset,
            shape: shape.to_vec(),
            stride: stride.to_vec(),
            parameter: false,
        }
    }

    /// Contiguous tensor over raw little-endian storage bytes
    pub fn raw_tensor(
        &mut self,
        storage_type: &'static str,
        bytes: Vec<u8>,
        numel: usize,
        shape: &[usize],
    ) -> PyValue {
        PyValue::Tensor {
            storage_type,
            key: self.add_storage(bytes),
            numel,
            offset: 0,
            shape: shape.to_vec(),
            stride: contiguous_strides(shape),
            parameter: false,
        }
    }

    /// Contiguous int64 tensor
    pub fn i64_tensor(&mut self, values: &[i64], shape: &[usize]) -> PyValue {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.raw_tensor("LongStorage", bytes, values.len(), shape)
    }

    /// Contiguous int32 tensor
    pub fn i32_tensor(&mut self, values: &[i32], shape: &[usize]) -> PyValue {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.raw_tensor("IntStorage", bytes, values.len(), shape)
    }

    /// Contiguous float64 tensor
    pub fn f64_tensor(&mut self, values: &[f64], shape: &[usize]) -> PyValue {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.raw_tensor("DoubleStorage", bytes, values.len(), shape)
    }

    /// Contiguous float16 tensor from IEEE half bit patterns
    pub fn f16_tensor(&mut self, bits: &[u16], shape: &[usize]) -> PyValue {
        let bytes = bits.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.raw_tensor("HalfStorage", bytes, bits.len(), shape)
    }

    /// Contiguous bool tensor
    pub fn bool_tensor(&mut self, values: &[bool], shape: &[usize]) -> PyValue {
        let bytes = values.iter().map(|&v| v as u8).collect();
        self.raw_tensor("BoolStorage", bytes, values.len(), shape)
    }

    pub fn insert(&mut self, key: &str, value: PyValue) -> &mut Self {
        self.entries.push((key.to_string(), value));
        self
    }

    /// Write the archive the way `torch.save` lays it out
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut pickle = vec![0x80, 0x02];
        encode(&mut pickle, &PyValue::Dict(self.entries.clone()));
        pickle.push(b'.');

        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut zip = zip::ZipWriter::new(File::create(path)?);

        zip.start_file("archive/data.pkl", options)?;
        zip.write_all(&pickle)?;

        for (key, bytes) in &self.storages {
            zip.start_file(format!("archive/data/{}", key), options)?;
            zip.write_all(bytes)?;
        }

        zip.start_file("archive/version", options)?;
        zip.write_all(b"3\n")?;

        zip.finish()?;
        Ok(())
    }
}

fn unicode(out: &mut Vec<u8>, text: &str) {
    out.push(b'X');
    out.extend_from_slice(&(text.len() as u32).to_le_bytes());
    out.extend_from_slice(text.as_bytes());
}

fn int(out: &mut Vec<u8>, value: i32) {
    out.push(b'J');
    out.extend_from_slice(&value.to_le_bytes());
}

fn global(out: &mut Vec<u8>, module: &str, name: &str) {
    out.push(b'c');
    out.extend_from_slice(module.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(name.as_bytes());
    out.push(b'\n');
}

fn int_tuple(out: &mut Vec<u8>, values: &[usize]) {
    out.push(b'(');
    for &v in values {
        int(out, v as i32);
    }
    out.push(b't');
}

fn ordered_dict(out: &mut Vec<u8>) {
    global(out, "collections", "OrderedDict");
    out.push(b')');
    out.push(b'R');
}

fn encode(out: &mut Vec<u8>, value: &PyValue) {
    match value {
        PyValue::Int(v) => int(out, *v),
        PyValue::Float(v) => {
            out.push(b'G');
            out.extend_from_slice(&v.to_be_bytes());
        }
        PyValue::Str(text) => unicode(out, text),
        PyValue::None => out.push(b'N'),
        PyValue::List(items) => {
            out.push(b']');
            if !items.is_empty() {
                out.push(b'(');
                for item in items {
                    encode(out, item);
                }
                out.push(b'e');
            }
        }
        PyValue::Tuple(items) => {
            out.push(b'(');
            for item in items {
                encode(out, item);
            }
            out.push(b't');
        }
        PyValue::Dict(entries) => {
            out.push(b'}');
            out.push(b'(');
            for (key, item) in entries {
                unicode(out, key);
                encode(out, item);
            }
            out.push(b'u');
        }
        PyValue::Tensor {
            storage_type,
            key,
            numel,
            offset,
            shape,
            stride,
            parameter,
        } => {
            if *parameter {
                global(out, "torch._utils", "_rebuild_parameter");
                out.push(b'(');
            }

            global(out, "torch._utils", "_rebuild_tensor_v2");
            out.push(b'(');
            out.push(b'(');
            unicode(out, "storage");
            global(out, "torch", storage_type);
            unicode(out, key);
            unicode(out, "cpu");
            int(out, *numel as i32);
            out.push(b't');
            out.push(b'Q');
            int(out, *offset as i32);
            int_tuple(out, shape);
            int_tuple(out, stride);
            out.push(0x89);
            ordered_dict(out);
            out.push(b't');
            out.push(b'R');

            if *parameter {
                out.push(0x88);
                ordered_dict(out);
                out.push(b't');
                out.push(b'R');
            }
        }
    }
}
