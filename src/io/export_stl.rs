// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Binary STL encoder

use super::ExportFormat;
use crate::error::ScanError;
use crate::geometry::GeometryBuffer;
use std::io::Cursor;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Encode a merged buffer as binary STL.
///
/// STL carries one normal per facet, so the facet normal is the average of
/// the three vertex normals.
pub fn encode_stl(buffer: &GeometryBuffer) -> Result<Vec<u8>, ScanError> {
    if buffer.vertices.is_empty() {
        return Err(ScanError::encoding(ExportFormat::Stl, "empty mesh"));
    }
    if buffer.indices.len() % 3 != 0 {
        return Err(ScanError::encoding(
            ExportFormat::Stl,
            format!("index count {} is not a multiple of 3", buffer.indices.len()),
        ));
    }
    if buffer.normals.len() != buffer.vertices.len() {
        return Err(ScanError::encoding(
            ExportFormat::Stl,
            format!(
                "{} normals for {} vertices",
                buffer.normals.len(),
                buffer.vertices.len()
            ),
        ));
    }
    // This encoder dereferences vertex data, so dangling indices are an
    // encoding failure rather than a panic.
    buffer
        .validate()
        .map_err(|e| ScanError::encoding(ExportFormat::Stl, e.to_string()))?;

    let triangles: Vec<StlTriangle> = buffer
        .indices
        .chunks_exact(3)
        .map(|face| {
            let i0 = face[0] as usize;
            let i1 = face[1] as usize;
            let i2 = face[2] as usize;

            let normal = (buffer.normals[i0] + buffer.normals[i1] + buffer.normals[i2]) / 3.0;

            let v0 = buffer.vertices[i0];
            let v1 = buffer.vertices[i1];
            let v2 = buffer.vertices[i2];

            StlTriangle {
                normal: Normal::new([normal.x, normal.y, normal.z]),
                vertices: [
                    StlVertex::new([v0.x, v0.y, v0.z]),
                    StlVertex::new([v1.x, v1.y, v1.z]),
                    StlVertex::new([v2.x, v2.y, v2.z]),
                ],
            }
        })
        .collect();

    let mut cursor = Cursor::new(Vec::new());
    stl_io::write_stl(&mut cursor, triangles.iter())
        .map_err(|e| ScanError::encoding(ExportFormat::Stl, e.to_string()))?;

    Ok(cursor.into_inner())
}
