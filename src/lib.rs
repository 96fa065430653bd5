// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Scanforge capture core
//!
//! Mesh capture accumulation and multi-format export for depth scanning.
//! Fragments arrive per anchor from the platform capture subsystem, are
//! accumulated into a live snapshot, and export as GLB, PLY, STL, or OBJ.

pub mod error;
pub mod geometry;
pub mod io;
pub mod session;

pub use error::ScanError;
pub use geometry::{AnchorId, GeometryBuffer, MeshAccumulator, MeshSnapshot};
pub use io::{encode, ExportFormat};
pub use session::{CaptureFeed, FragmentEvent, ScanSession, ScanState};

use std::path::Path;

/// Encode a merged buffer and write it to `path` in one step.
///
/// Encoding happens fully in memory, so a failed encode writes nothing.
/// Directory creation and overwrite policy stay with the caller.
pub fn export_mesh(
    buffer: &GeometryBuffer,
    format: ExportFormat,
    path: impl AsRef<Path>,
) -> Result<(), ScanError> {
    let bytes = io::encode(buffer, format)?;
    std::fs::write(&path, bytes).map_err(|source| ScanError::Export {
        path: path.as_ref().to_path_buf(),
        source,
    })
}
