// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! I/O module - export encoders and format dispatch

mod export_glb;
mod export_obj;
mod export_ply;
mod export_stl;

pub use export_glb::encode_glb;
pub use export_obj::encode_obj;
pub use export_ply::encode_ply;
pub use export_stl::encode_stl;

use crate::error::ScanError;
use crate::geometry::GeometryBuffer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Binary glTF scene-interchange container
    Glb,
    /// ASCII point/face document
    Ply,
    /// Binary stereolithography solid
    Stl,
    /// Wavefront OBJ text
    Obj,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Glb => "glb",
            ExportFormat::Ply => "ply",
            ExportFormat::Stl => "stl",
            ExportFormat::Obj => "obj",
        }
    }

    /// Conventional file suffix for the format.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "glb" => Ok(ExportFormat::Glb),
            "ply" => Ok(ExportFormat::Ply),
            "stl" => Ok(ExportFormat::Stl),
            "obj" => Ok(ExportFormat::Obj),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

/// Serialize a merged buffer in the requested format.
pub fn encode(buffer: &GeometryBuffer, format: ExportFormat) -> Result<Vec<u8>, ScanError> {
    match format {
        ExportFormat::Glb => encode_glb(buffer),
        ExportFormat::Ply => encode_ply(buffer).map(String::into_bytes),
        ExportFormat::Stl => encode_stl(buffer),
        ExportFormat::Obj => encode_obj(buffer).map(String::into_bytes),
    }
}
