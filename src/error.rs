// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Export errors

use thiserror::Error;

/// Problems with the metadata of the objects being exported.
///
/// `NoActiveObject` and a nameless active object abort the export; the
/// per-object variants only skip the offending object.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("no active object to export")]
    NoActiveObject,

    #[error("active object {object} does not have a name")]
    MissingName { object: String },

    #[error("object {object} does not have a filename")]
    MissingFilename { object: String },

    #[error("object {object} does not have a color_code")]
    MissingColorCode { object: String },
}
