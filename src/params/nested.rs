// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Nested number lists, the JSON shape of a tensor

use crate::io::serialize_python_float;
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use serde::Serialize;

/// A tensor as nested lists of plain numbers.
///
/// A rank-0 tensor becomes a bare number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NestedList {
    Int(i64),
    #[serde(serialize_with = "serialize_python_float")]
    Float(f64),
    List(Vec<NestedList>),
}

impl NestedList {
    /// Detach `tensor`, bring it to host memory and unroll it row-major.
    ///
    /// Integer dtypes stay integers; floating dtypes are widened to f64.
    /// NaN and infinities are kept and written as `NaN`/`Infinity`.
    pub fn from_tensor(tensor: &Tensor) -> Result<Self> {
        let tensor = tensor.detach().to_device(&Device::Cpu)?;
        let dims = tensor.dims().to_vec();
        let flat = tensor.reshape(tensor.elem_count())?;

        if tensor.dtype().is_int() {
            let values = flat.to_dtype(DType::I64)?.to_vec1::<i64>()?;
            Ok(build(&values, &dims, &NestedList::Int))
        } else {
            let values = flat.to_dtype(DType::F64)?.to_vec1::<f64>()?;
            Ok(build(&values, &dims, &NestedList::Float))
        }
    }

    /// Nesting depth; equals the rank of the source tensor
    pub fn depth(&self) -> usize {
        match self {
            NestedList::List(items) => 1 + items.first().map_or(0, NestedList::depth),
            _ => 0,
        }
    }

    /// Number of leaf numbers
    pub fn leaf_count(&self) -> usize {
        match self {
            NestedList::List(items) => items.iter().map(NestedList::leaf_count).sum(),
            _ => 1,
        }
    }
}

fn build<T: Copy>(values: &[T], dims: &[usize], leaf: &impl Fn(T) -> NestedList) -> NestedList {
    match dims.split_first() {
        None => leaf(values[0]),
        Some((&len, rest)) => {
            let chunk: usize = rest.iter().product();
            NestedList::List(
                (0..len)
                    .map(|i| build(&values[i * chunk..(i + 1) * chunk], rest, leaf))
                    .collect(),
            )
        }
    }
}
