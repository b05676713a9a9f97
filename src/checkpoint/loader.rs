// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! PyTorch zip-archive checkpoint loader
//!
//! `torch.save` writes a zip archive holding a pickle stream (`<name>/data.pkl`)
//! and one raw little-endian storage blob per tensor (`<name>/data/<key>`).
//! The pickle is decoded with candle's pickle machinery and every value in the
//! root dict is classified into a [`CheckpointValue`].

use super::{Checkpoint, CheckpointValue};
use candle_core::pickle::{Object, Stack};
use candle_core::{DType, Device, Tensor};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a checkpoint archive
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No such file or directory: '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read checkpoint: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a PyTorch zip checkpoint: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to decode checkpoint pickle: {0}")]
    Pickle(#[from] candle_core::Error),

    #[error("unsupported tensor storage type {0}")]
    UnsupportedStorage(String),

    #[error("malformed checkpoint: {0}")]
    Malformed(String),
}

fn malformed(message: impl Into<String>) -> LoadError {
    LoadError::Malformed(message.into())
}

/// Load a checkpoint archive into memory.
///
/// When `state_key` is given and the root dict holds a nested dict under that
/// key, the nested dict is loaded instead of the root.
pub fn load_checkpoint(
    path: impl AsRef<Path>,
    state_key: Option<&str>,
) -> Result<Checkpoint, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    let pickle_name = archive
        .file_names()
        .find(|name| name.ends_with("data.pkl"))
        .map(str::to_owned)
        .ok_or_else(|| malformed("archive has no data.pkl entry"))?;
    let data_dir = pickle_name
        .strip_suffix(".pkl")
        .unwrap_or(&pickle_name)
        .to_owned();

    let root = {
        let entry = archive.by_name(&pickle_name)?;
        let mut reader = BufReader::new(entry);
        let mut stack = Stack::empty();
        stack.read_loop(&mut reader)?;
        stack.finalize()?
    };

    let entries = match unwrap_module(root) {
        Object::Dict(entries) => entries,
        other => {
            return Err(malformed(format!(
                "expected a dict at the checkpoint root, found {}",
                describe(&other)
            )))
        }
    };
    let entries = match state_key {
        Some(key) => select_state(entries, key),
        None => entries,
    };

    let mut decoder = Decoder {
        archive: &mut archive,
        data_dir,
    };
    let mut checkpoint = Checkpoint::new();
    for (key, value) in &entries {
        let Object::Unicode(key) = key else {
            log::debug!("skipping non-string checkpoint key {}", describe(key));
            continue;
        };
        let value = decoder.decode(value)?;
        log::debug!("loaded checkpoint entry '{}' ({})", key, value.kind());
        checkpoint.insert(key.clone(), value);
    }

    Ok(checkpoint)
}

/// Scripted modules pickle their state dict as the BUILD args of a `Module`
fn unwrap_module(obj: Object) -> Object {
    if let Object::Build { callable, args } = &obj {
        if let Object::Reduce { callable, .. } = callable.as_ref() {
            if let Object::Class {
                module_name,
                class_name,
            } = callable.as_ref()
            {
                if module_name == "__torch__" && class_name == "Module" {
                    return args.as_ref().clone();
                }
            }
        }
    }
    obj
}

fn select_state(entries: Vec<(Object, Object)>, key: &str) -> Vec<(Object, Object)> {
    entries
        .into_iter()
        .find(|(k, _)| matches!(k, Object::Unicode(k) if k == key))
        .and_then(|(_, v)| match v {
            Object::Dict(nested) => Some(nested),
            _ => None,
        })
        .unwrap_or_default()
}

struct Decoder<'a, R: Read + std::io::Seek> {
    archive: &'a mut zip::ZipArchive<R>,
    data_dir: String,
}

impl<R: Read + std::io::Seek> Decoder<'_, R> {
    fn decode(&mut self, obj: &Object) -> Result<CheckpointValue, LoadError> {
        let value = match obj {
            Object::Int(v) => CheckpointValue::Scalar(*v as f64),
            Object::Float(v) => CheckpointValue::Scalar(*v),
            Object::Bool(b) => CheckpointValue::Scalar(if *b { 1.0 } else { 0.0 }),
            Object::None => CheckpointValue::None,
            Object::List(items) | Object::Tuple(items) => CheckpointValue::Sequence(
                items
                    .iter()
                    .map(|item| self.decode(item))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => match tensor_spec(obj) {
                Ok(Some(spec)) => CheckpointValue::Array(self.read_tensor(&spec)?),
                Ok(None) => CheckpointValue::Opaque(describe(obj)),
                Err(LoadError::UnsupportedStorage(storage)) => {
                    log::debug!("keeping {} tensor as an opaque value", storage);
                    CheckpointValue::Opaque(format!("{} tensor", storage))
                }
                Err(e) => return Err(e),
            },
        };
        Ok(value)
    }

    fn read_tensor(&mut self, spec: &TensorSpec) -> Result<Tensor, LoadError> {
        let entry_name = format!("{}/{}", self.data_dir, spec.storage_key);
        let mut storage = Vec::new();
        self.archive
            .by_name(&entry_name)?
            .read_to_end(&mut storage)?;

        let elem_size = spec.storage.elem_size();
        if storage.len() < spec.storage_len * elem_size {
            return Err(malformed(format!(
                "storage {} holds {} bytes, expected {}",
                entry_name,
                storage.len(),
                spec.storage_len * elem_size
            )));
        }

        let data = gather_strided(&storage, elem_size, spec.offset, &spec.shape, &spec.stride)?;
        let data = spec.storage.widen(data);
        let tensor =
            Tensor::from_raw_buffer(&data, spec.storage.dtype(), &spec.shape, &Device::Cpu)?;
        Ok(tensor)
    }
}

/// Everything needed to materialize one pickled tensor
#[derive(Debug, Clone, PartialEq)]
struct TensorSpec {
    storage: StorageKind,
    storage_key: String,
    storage_len: usize,
    offset: usize,
    shape: Vec<usize>,
    stride: Vec<usize>,
}

fn tensor_spec(obj: &Object) -> Result<Option<TensorSpec>, LoadError> {
    let Object::Reduce { callable, args } = obj else {
        return Ok(None);
    };
    let Object::Class {
        module_name,
        class_name,
    } = callable.as_ref()
    else {
        return Ok(None);
    };

    match (module_name.as_str(), class_name.as_str()) {
        ("torch._utils", "_rebuild_tensor_v2") => rebuild_tensor_args(args).map(Some),
        // nn.Parameter: (data, requires_grad, hooks). Dropping the wrapper detaches it.
        ("torch._utils", "_rebuild_parameter") => match tuple_items(args)?.first() {
            Some(data) => tensor_spec(data),
            None => Err(malformed("empty _rebuild_parameter arguments")),
        },
        // Tensor subclasses: (func, type, args, state)
        ("torch._tensor", "_rebuild_from_type_v2") => {
            let items = tuple_items(args)?;
            if items.len() < 3 {
                return Err(malformed("short _rebuild_from_type_v2 arguments"));
            }
            tensor_spec(&Object::Reduce {
                callable: Box::new(items[0].clone()),
                args: Box::new(items[2].clone()),
            })
        }
        _ => Ok(None),
    }
}

fn rebuild_tensor_args(args: &Object) -> Result<TensorSpec, LoadError> {
    let items = tuple_items(args)?;
    if items.len() < 4 {
        return Err(malformed("short _rebuild_tensor_v2 arguments"));
    }

    let Object::PersistentLoad(id) = &items[0] else {
        return Err(malformed("tensor storage is not a persistent reference"));
    };
    let id = tuple_items(id)?;
    if id.len() < 5 {
        return Err(malformed("short storage reference"));
    }
    let storage = match &id[1] {
        Object::Class { class_name, .. } => storage_kind(class_name)?,
        other => return Err(malformed(format!("storage type is {}", describe(other)))),
    };
    let storage_key = match &id[2] {
        Object::Unicode(key) => key.clone(),
        other => return Err(malformed(format!("storage key is {}", describe(other)))),
    };

    Ok(TensorSpec {
        storage,
        storage_key,
        storage_len: to_usize(&id[4])?,
        offset: to_usize(&items[1])?,
        shape: usize_tuple(&items[2])?,
        stride: usize_tuple(&items[3])?,
    })
}

/// How a storage's elements map onto a candle dtype
#[derive(Debug, Clone, Copy, PartialEq)]
enum StorageKind {
    /// Elements are copied byte for byte
    Native(DType),
    /// Signed integers narrower than i64, widened while loading
    NarrowInt(usize),
}

impl StorageKind {
    fn elem_size(self) -> usize {
        match self {
            StorageKind::Native(dtype) => dtype.size_in_bytes(),
            StorageKind::NarrowInt(bytes) => bytes,
        }
    }

    fn dtype(self) -> DType {
        match self {
            StorageKind::Native(dtype) => dtype,
            StorageKind::NarrowInt(_) => DType::I64,
        }
    }

    /// Sign-extend little-endian narrow integers to i64
    fn widen(self, data: Vec<u8>) -> Vec<u8> {
        let StorageKind::NarrowInt(bytes) = self else {
            return data;
        };
        data.chunks_exact(bytes)
            .flat_map(|chunk| {
                let value = match bytes {
                    1 => chunk[0] as i8 as i64,
                    2 => i16::from_le_bytes([chunk[0], chunk[1]]) as i64,
                    _ => i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i64,
                };
                value.to_le_bytes()
            })
            .collect()
    }
}

fn storage_kind(class_name: &str) -> Result<StorageKind, LoadError> {
    let kind = match class_name {
        "FloatStorage" => StorageKind::Native(DType::F32),
        "DoubleStorage" => StorageKind::Native(DType::F64),
        "HalfStorage" => StorageKind::Native(DType::F16),
        "BFloat16Storage" => StorageKind::Native(DType::BF16),
        "ByteStorage" | "BoolStorage" => StorageKind::Native(DType::U8),
        "LongStorage" => StorageKind::Native(DType::I64),
        "IntStorage" => StorageKind::NarrowInt(4),
        "ShortStorage" => StorageKind::NarrowInt(2),
        "CharStorage" => StorageKind::NarrowInt(1),
        other => return Err(LoadError::UnsupportedStorage(other.to_owned())),
    };
    Ok(kind)
}

fn tuple_items(obj: &Object) -> Result<&[Object], LoadError> {
    match obj {
        Object::Tuple(items) => Ok(items),
        other => Err(malformed(format!("expected a tuple, found {}", describe(other)))),
    }
}

fn to_usize(obj: &Object) -> Result<usize, LoadError> {
    match obj {
        Object::Int(v) if *v >= 0 => Ok(*v as usize),
        other => Err(malformed(format!(
            "expected a non-negative int, found {}",
            describe(other)
        ))),
    }
}

fn usize_tuple(obj: &Object) -> Result<Vec<usize>, LoadError> {
    tuple_items(obj)?.iter().map(to_usize).collect()
}

fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for dim in (0..shape.len().saturating_sub(1)).rev() {
        strides[dim] = strides[dim + 1] * shape[dim + 1];
    }
    strides
}

/// Copy the logical elements of a strided view out of its storage, row-major
fn gather_strided(
    storage: &[u8],
    elem_size: usize,
    offset: usize,
    shape: &[usize],
    stride: &[usize],
) -> Result<Vec<u8>, LoadError> {
    if shape.len() != stride.len() {
        return Err(malformed(format!(
            "tensor has {} dims but {} strides",
            shape.len(),
            stride.len()
        )));
    }

    let numel: usize = shape.iter().product();
    if numel == 0 {
        return Ok(Vec::new());
    }

    let last = offset
        + shape
            .iter()
            .zip(stride)
            .map(|(dim, step)| (dim - 1) * step)
            .sum::<usize>();
    if (last + 1) * elem_size > storage.len() {
        return Err(malformed("tensor view exceeds its storage"));
    }

    if stride == contiguous_strides(shape).as_slice() {
        return Ok(storage[offset * elem_size..(offset + numel) * elem_size].to_vec());
    }

    let mut out = Vec::with_capacity(numel * elem_size);
    let mut index = vec![0usize; shape.len()];
    for _ in 0..numel {
        let pos = offset
            + index
                .iter()
                .zip(stride)
                .map(|(i, step)| i * step)
                .sum::<usize>();
        out.extend_from_slice(&storage[pos * elem_size..(pos + 1) * elem_size]);

        for dim in (0..shape.len()).rev() {
            index[dim] += 1;
            if index[dim] < shape[dim] {
                break;
            }
            index[dim] = 0;
        }
    }

    Ok(out)
}

/// Short Python-flavoured name for an unpickled object
fn describe(obj: &Object) -> String {
    match obj {
        Object::Class {
            module_name,
            class_name,
        } => format!("class {}.{}", module_name, class_name),
        Object::Int(_) => "int".to_owned(),
        Object::Float(_) => "float".to_owned(),
        Object::Unicode(_) => "str".to_owned(),
        Object::Bool(_) => "bool".to_owned(),
        Object::None => "None".to_owned(),
        Object::Tuple(_) => "tuple".to_owned(),
        Object::List(_) => "list".to_owned(),
        Object::Dict(_) => "dict".to_owned(),
        Object::Reduce { callable, .. } | Object::Build { callable, .. } => {
            match callable.as_ref() {
                Object::Class {
                    module_name,
                    class_name,
                } => format!("{}.{} object", module_name, class_name),
                _ => "object".to_owned(),
            }
        }
        Object::PersistentLoad(_) => "persistent reference".to_owned(),
        _ => "object".to_owned(),
    }
}
