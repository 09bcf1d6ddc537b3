// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - part import and LDraw line export

mod exporter;
mod format;
mod importer;
mod scene;
mod serializer;

pub use exporter::{export_ldraw, render_lines, write_lines};
pub use format::{format_decimal, MAX_PLACES};
pub use importer::{import_part, match_edges, ImportedPart};
pub use scene::{ExportScene, LDrawProps, SceneObject};
pub use serializer::LineSerializer;
