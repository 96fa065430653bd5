// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Wavefront OBJ encoder

use super::ExportFormat;
use crate::error::ScanError;
use crate::geometry::GeometryBuffer;

/// Encode a merged buffer as Wavefront OBJ text: `v` and `vn` lines in
/// vertex order, then one 1-based `f` line per triangle.
pub fn encode_obj(buffer: &GeometryBuffer) -> Result<String, ScanError> {
    if buffer.vertices.is_empty() {
        return Err(ScanError::encoding(ExportFormat::Obj, "empty mesh"));
    }
    if buffer.indices.len() % 3 != 0 {
        return Err(ScanError::encoding(
            ExportFormat::Obj,
            format!("index count {} is not a multiple of 3", buffer.indices.len()),
        ));
    }
    if buffer.normals.len() != buffer.vertices.len() {
        return Err(ScanError::encoding(
            ExportFormat::Obj,
            format!(
                "{} normals for {} vertices",
                buffer.normals.len(),
                buffer.vertices.len()
            ),
        ));
    }

    let mut out = String::new();
    out.push_str("o scan\n");

    for vertex in &buffer.vertices {
        out.push_str(&format!("v {} {} {}\n", vertex.x, vertex.y, vertex.z));
    }

    for normal in &buffer.normals {
        out.push_str(&format!("vn {} {} {}\n", normal.x, normal.y, normal.z));
    }

    for face in buffer.indices.chunks_exact(3) {
        // OBJ indices are 1-based; vertex and normal share the index.
        out.push_str(&format!(
            "f {0}//{0} {1}//{1} {2}//{2}\n",
            face[0] + 1,
            face[1] + 1,
            face[2] + 1
        ));
    }

    Ok(out)
}
