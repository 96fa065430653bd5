// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Error taxonomy for capture and export

use crate::io::ExportFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the capture and export pipeline.
///
/// Every variant is surfaced synchronously to the immediate caller and none
/// of them leave the session unusable: a rejected fragment keeps the
/// accumulator's previous state, and a failed export writes no file.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A fragment referenced a vertex that does not exist. The fragment is
    /// rejected and the anchor keeps its previous geometry, if any.
    #[error("triangle index {index} out of range for {vertex_count} vertices")]
    MalformedMesh { index: u32, vertex_count: usize },

    /// `stop()` was called before any point was captured.
    #[error("no points were captured during scanning")]
    NoDataCaptured,

    /// An encoder was handed a buffer it cannot serialize.
    #[error("cannot encode {format}: {reason}")]
    Encoding {
        format: ExportFormat,
        reason: String,
    },

    /// Writing the encoded output to disk failed.
    #[error("failed to write {}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export was requested before any scan completed successfully.
    #[error("no mesh data available to export")]
    NoMeshAvailable,
}

impl ScanError {
    pub(crate) fn encoding(format: ExportFormat, reason: impl Into<String>) -> Self {
        ScanError::Encoding {
            format,
            reason: reason.into(),
        }
    }
}
