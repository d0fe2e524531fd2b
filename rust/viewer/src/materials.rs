// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Colors and the per-type default material table

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// RGBA color, components in `[0, 1]`
pub type Rgba = [f32; 4];

/// Key of the fallback entry in a [`MaterialTable`]
pub const DEFAULT_MATERIAL: &str = "DEFAULT";

/// Fallback used when a table somehow lacks [`DEFAULT_MATERIAL`]
const FALLBACK_COLOR: Rgba = [0.5, 0.5, 0.5, 1.0];

/// A color as given to `set_color`: diffuse RGB plus optional opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub rgb: [f32; 3],
    pub opacity: Option<f32>,
}

impl Color {
    /// Opaque-agnostic color (opacity left untouched when applied)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            rgb: [r, g, b],
            opacity: None,
        }
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            rgb: [r, g, b],
            opacity: Some(a),
        }
    }

    pub fn from_rgba(rgba: Rgba) -> Self {
        Self::rgba(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// From a loose component list: three components are RGB, a fourth is
    /// opacity, anything past that is ignored.
    pub fn from_components(components: &[f32]) -> Result<Self> {
        match components {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            [r, g, b, a, ..] => Ok(Self::rgba(*r, *g, *b, *a)),
            _ => Err(Error::InvalidParameter {
                name: "color",
                message: format!("expected 3 or 4 components, got {}", components.len()),
            }),
        }
    }

    /// Whether applying this color puts the object into transparency compositing
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.opacity.is_some_and(|a| a < 1.0)
    }
}

/// Default RGBA per semantic type, with a [`DEFAULT_MATERIAL`] fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "FxHashMap<String, Rgba>",
    into = "FxHashMap<String, Rgba>"
)]
pub struct MaterialTable {
    colors: FxHashMap<String, Rgba>,
}

impl TryFrom<FxHashMap<String, Rgba>> for MaterialTable {
    type Error = Error;

    fn try_from(mut colors: FxHashMap<String, Rgba>) -> Result<Self> {
        if let Some((tag, _)) = colors
            .iter()
            .find(|(_, rgba)| rgba.iter().any(|c| !(0.0..=1.0).contains(c)))
        {
            return Err(Error::Config(format!(
                "material '{}' has a component outside [0, 1]",
                tag
            )));
        }

        colors
            .entry(DEFAULT_MATERIAL.to_string())
            .or_insert(FALLBACK_COLOR);
        Ok(Self { colors })
    }
}

impl From<MaterialTable> for FxHashMap<String, Rgba> {
    fn from(table: MaterialTable) -> Self {
        table.colors
    }
}

impl MaterialTable {
    /// Table with only the fallback entry
    pub fn empty() -> Self {
        let mut colors = FxHashMap::default();
        colors.insert(DEFAULT_MATERIAL.to_string(), FALLBACK_COLOR);
        Self { colors }
    }

    /// Built-in colors for common IFC element types
    pub fn builtin() -> Self {
        const ENTRIES: &[(&str, Rgba)] = &[
            // Walls - warm brown
            ("IfcWall", [0.537, 0.337, 0.237, 1.0]),
            ("IfcWallStandardCase", [0.537, 0.337, 0.237, 1.0]),
            // Slabs, roofs
            ("IfcSlab", [0.637, 0.603, 0.670, 1.0]),
            ("IfcRoof", [0.837, 0.203, 0.270, 1.0]),
            // Structural
            ("IfcColumn", [0.437, 0.603, 0.370, 1.0]),
            ("IfcBeam", [0.437, 0.603, 0.370, 1.0]),
            ("IfcMember", [0.847, 0.427, 0.5, 1.0]),
            ("IfcPlate", [0.847, 0.427, 0.0, 0.5]),
            // Openings and glazing - transparent
            ("IfcWindow", [0.137, 0.403, 0.870, 0.5]),
            ("IfcCurtainWall", [0.5, 0.5, 0.5, 0.5]),
            ("IfcOpeningElement", [0.137, 0.403, 0.870, 0.0]),
            ("IfcSpace", [0.137, 0.403, 0.870, 0.5]),
            ("IfcDoor", [0.637, 0.603, 0.670, 1.0]),
            // Circulation
            ("IfcStair", [0.637, 0.603, 0.670, 1.0]),
            ("IfcStairFlight", [0.637, 0.603, 0.670, 1.0]),
            ("IfcRailing", [0.137, 0.403, 0.870, 1.0]),
            // Finishes and furniture
            ("IfcCovering", [0.637, 0.603, 0.670, 1.0]),
            ("IfcFurnishingElement", [0.437, 0.603, 0.370, 1.0]),
            ("IfcBuildingElementProxy", [0.5, 0.5, 0.5, 1.0]),
            // Services
            ("IfcFlowSegment", [0.6, 0.4, 0.5, 1.0]),
            ("IfcFlowTerminal", [0.6, 0.4, 0.5, 1.0]),
            ("IfcDuctSegment", [0.847, 0.427, 0.0, 1.0]),
            ("IfcLightFixture", [0.847, 0.847, 0.871, 1.0]),
            ("IfcSite", [0.137, 0.403, 0.870, 1.0]),
            (DEFAULT_MATERIAL, FALLBACK_COLOR),
        ];

        Self {
            colors: ENTRIES
                .iter()
                .map(|(tag, rgba)| (tag.to_string(), *rgba))
                .collect(),
        }
    }

    /// Parse a JSON object of `type -> [r, g, b, a]`.
    ///
    /// Components must lie in `[0, 1]`. A missing `DEFAULT` entry is filled
    /// with the built-in fallback.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Color for `type_tag`, falling back to the `DEFAULT` entry
    pub fn color_for(&self, type_tag: &str) -> Rgba {
        self.colors
            .get(type_tag)
            .or_else(|| self.colors.get(DEFAULT_MATERIAL))
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Explicit entry for `type_tag`, without fallback
    pub fn get(&self, type_tag: &str) -> Option<Rgba> {
        self.colors.get(type_tag).copied()
    }

    pub fn insert(&mut self, type_tag: impl Into<String>, rgba: Rgba) -> Option<Rgba> {
        self.colors.insert(type_tag.into(), rgba)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::builtin()
    }
}
