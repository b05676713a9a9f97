// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Typed checkpoint values

use candle_core::Tensor;

/// A value stored under a checkpoint key, classified once at load time
#[derive(Debug, Clone)]
pub enum CheckpointValue {
    /// Python int, float or bool
    Scalar(f64),
    /// Dense tensor, already detached from any autograd wrapper
    Array(Tensor),
    /// Python list or tuple
    Sequence(Vec<CheckpointValue>),
    /// Python `None`
    None,
    /// Anything else, with a short description of what it was
    Opaque(String),
}

impl CheckpointValue {
    /// Unwrap a one-element sequence to its sole element.
    ///
    /// Only a single level is removed, and sequences of any other length are
    /// returned unchanged.
    pub fn unwrap_singleton(&self) -> &CheckpointValue {
        match self {
            CheckpointValue::Sequence(items) if items.len() == 1 => &items[0],
            other => other,
        }
    }

    /// Borrow the tensor if this value is an array
    pub fn as_array(&self) -> Option<&Tensor> {
        match self {
            CheckpointValue::Array(tensor) => Some(tensor),
            _ => None,
        }
    }

    /// A stored `None` is treated like an absent key by lookups
    pub fn is_none(&self) -> bool {
        matches!(self, CheckpointValue::None)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CheckpointValue::Scalar(_) => "scalar",
            CheckpointValue::Array(_) => "array",
            CheckpointValue::Sequence(_) => "sequence",
            CheckpointValue::None => "none",
            CheckpointValue::Opaque(_) => "opaque",
        }
    }
}

/// In-memory checkpoint: string keys in file order
#[derive(Debug, Clone, Default)]
pub struct Checkpoint {
    entries: Vec<(String, CheckpointValue)>,
}

impl Checkpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: CheckpointValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CheckpointValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, CheckpointValue)> for Checkpoint {
    fn from_iter<I: IntoIterator<Item = (String, CheckpointValue)>>(iter: I) -> Self {
        let mut checkpoint = Checkpoint::new();
        for (key, value) in iter {
            checkpoint.insert(key, value);
        }
        checkpoint
    }
}
