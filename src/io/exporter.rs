// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! LDraw file exporter

use super::scene::ExportScene;
use super::serializer::LineSerializer;
use crate::config::ExportOptions;
use crate::ldraw::ColorTable;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Serialize `scene` and write it to `path`.
///
/// Nothing is written when the scene has no usable active object. Returns
/// the number of lines written.
pub fn export_ldraw(
    path: impl AsRef<Path>,
    scene: &ExportScene,
    options: &ExportOptions,
    colors: &ColorTable,
) -> Result<usize> {
    let path = path.as_ref();
    let lines = LineSerializer::new(options, colors)
        .serialize(scene)
        .context("Failed to serialize scene")?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_lines(&mut writer, &lines)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush file: {}", path.display()))?;

    info!(path = %path.display(), lines = lines.len(), "exported LDraw file");
    Ok(lines.len())
}

/// Write each line followed by `\n`; empty lines become a bare newline
pub fn write_lines<W: Write>(writer: &mut W, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Render lines as the text [`export_ldraw`] would write
pub fn render_lines(lines: &[String]) -> String {
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}
