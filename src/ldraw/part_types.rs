// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! `!LDRAW_ORG` part type classification

const MODEL_TYPES: &[&str] = &["model", "unofficial_model", "un-official model", "submodel"];
const SHORTCUT_TYPES: &[&str] = &["shortcut", "unofficial_shortcut", "un-official shortcut"];

fn matches(part_type: &str, table: &[&str]) -> bool {
    let part_type = part_type.trim().to_lowercase();
    table.iter().any(|t| *t == part_type)
}

/// Models include files with no declared type
pub fn is_model(part_type: Option<&str>) -> bool {
    match part_type {
        None => true,
        Some(t) if t.trim().is_empty() => true,
        Some(t) => matches(t, MODEL_TYPES),
    }
}

pub fn is_shortcut(part_type: Option<&str>) -> bool {
    part_type.is_some_and(|t| matches(t, SHORTCUT_TYPES))
}

/// Models and shortcuts share the model header layout
pub fn is_like_model(part_type: Option<&str>) -> bool {
    is_model(part_type) || is_shortcut(part_type)
}
