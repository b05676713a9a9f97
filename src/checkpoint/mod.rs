// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Checkpoint module - PyTorch checkpoint archives as typed key/value maps

mod loader;
mod value;

pub use loader::{load_checkpoint, LoadError};
pub use value::{Checkpoint, CheckpointValue};
