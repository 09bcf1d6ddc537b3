// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! LDraw data model - parsed primitives, colors and part metadata

mod color;
pub mod part_types;
mod special_parts;
mod texmap;
mod types;

pub use color::{color_sort_key, Color, ColorTable, EDGE_COLOR_CODE, INHERIT_COLOR_CODE};
pub use special_parts::{PartCache, SlopeRange};
pub use texmap::{PeTexMap, TexMap, TexMapMethod};
pub use types::{EdgeData, FaceData, GeometryData};

/// Process-wide lookups used by one pipeline run.
///
/// Owned by the caller and passed by reference; call [`PipelineCaches::reset`]
/// at the start of every import or export run.
#[derive(Debug, Clone, Default)]
pub struct PipelineCaches {
    pub colors: ColorTable,
    pub parts: PartCache,
}

impl PipelineCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop memoized lookups so a new run starts from a clean state
    pub fn reset(&mut self) {
        self.colors.reset();
        self.parts.reset();
    }
}
