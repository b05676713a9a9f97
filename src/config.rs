// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tool configuration
//!
//! Defaults reproduce the fixed paths the tools have always used. A
//! `gsverse.toml` in the working directory, then `GSVERSE_*` environment
//! variables, then command-line flags may override them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "gsverse.toml";

/// Configuration for both tools
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub params: ParamsConfig,
    pub mesh: MeshConfig,
}

/// Parameter exporter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    /// Checkpoint archive to read
    pub input: PathBuf,
    /// JSON file to write
    pub output: PathBuf,
    /// Nested dict holding the parameters, e.g. `state_dict`
    pub state_key: Option<String>,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("model_params.pt"),
            output: PathBuf::from("model_params.json"),
            state_key: None,
        }
    }
}

/// Mesh reexporter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// OBJ file to read
    pub input: PathBuf,
    /// OBJ file to write
    pub output: PathBuf,
    /// Digits after the decimal point for vertex coordinates (writer default: 6)
    pub decimal_places: Option<usize>,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("mesh.obj"),
            output: PathBuf::from("mesh_pytorch3D.obj"),
            decimal_places: None,
        }
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl ParamsConfig {
    /// Apply `GSVERSE_PARAMS_*` and `GSVERSE_STATE_KEY` read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(input) = lookup("GSVERSE_PARAMS_INPUT") {
            self.input = PathBuf::from(input);
        }

        if let Some(output) = lookup("GSVERSE_PARAMS_OUTPUT") {
            self.output = PathBuf::from(output);
        }

        if let Some(key) = lookup("GSVERSE_STATE_KEY") {
            self.state_key = Some(key).filter(|k| !k.is_empty());
        }
    }
}

impl MeshConfig {
    /// Apply `GSVERSE_MESH_*` and `GSVERSE_DECIMAL_PLACES` read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(input) = lookup("GSVERSE_MESH_INPUT") {
            self.input = PathBuf::from(input);
        }

        if let Some(output) = lookup("GSVERSE_MESH_OUTPUT") {
            self.output = PathBuf::from(output);
        }

        if let Some(places) = lookup("GSVERSE_DECIMAL_PLACES") {
            let places = places
                .parse()
                .with_context(|| format!("Invalid GSVERSE_DECIMAL_PLACES: {}", places))?;
            self.decimal_places = Some(places);
        }

        Ok(())
    }
}

impl ToolsConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ToolsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load the configuration file.
    ///
    /// An explicit `path` must exist; otherwise `gsverse.toml` is used when
    /// present and the defaults when it is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parameter exporter settings with `GSVERSE_*` environment overrides
    pub fn load_params(path: Option<&Path>) -> Result<ParamsConfig> {
        let mut config = Self::load(path)?.params;
        config.apply_overrides(env_lookup);
        Ok(config)
    }

    /// Mesh reexporter settings with `GSVERSE_*` environment overrides
    pub fn load_mesh(path: Option<&Path>) -> Result<MeshConfig> {
        let mut config = Self::load(path)?.mesh;
        config.apply_overrides(env_lookup)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
