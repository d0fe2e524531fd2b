// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration, from JSON or environment variables.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::materials::MaterialTable;

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Color newly registered objects by their type.
    pub apply_default_materials: bool,
    /// Per-type default colors.
    pub materials: MaterialTable,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            apply_default_materials: true,
            materials: MaterialTable::builtin(),
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON configuration; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from environment variables.
    ///
    /// - `BIMVIEW_DEFAULT_MATERIALS`: `true` / `false`
    /// - `BIMVIEW_MATERIALS_FILE`: path to a JSON material table
    ///
    /// Unusable values are logged and replaced by defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) against an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("BIMVIEW_DEFAULT_MATERIALS") {
            match value.trim().parse::<bool>() {
                Ok(flag) => config.apply_default_materials = flag,
                Err(_) => tracing::warn!(
                    value = %value,
                    "BIMVIEW_DEFAULT_MATERIALS is not a boolean, using default"
                ),
            }
        }

        if let Some(path) = lookup("BIMVIEW_MATERIALS_FILE") {
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("{}: {}", path, e)))
                .and_then(|json| MaterialTable::from_json(&json));
            match loaded {
                Ok(materials) => {
                    tracing::debug!(
                        path = %path,
                        entries = materials.len(),
                        "Loaded material table"
                    );
                    config.materials = materials;
                }
                Err(e) => tracing::warn!(
                    error = %e,
                    "Could not load material table, using built-in"
                ),
            }
        }

        config
    }
}
