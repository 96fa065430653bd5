// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! ASCII PLY encoder

use super::ExportFormat;
use crate::error::ScanError;
use crate::geometry::GeometryBuffer;

/// Encode a merged buffer as an ASCII PLY document.
///
/// Output is byte-identical across calls on an unchanged buffer: a fixed
/// header (vertex count, face count, per-vertex x/y/z/nx/ny/nz properties),
/// one line per vertex, one `3 i0 i1 i2` line per face.
pub fn encode_ply(buffer: &GeometryBuffer) -> Result<String, ScanError> {
    if buffer.indices.len() % 3 != 0 {
        return Err(ScanError::encoding(
            ExportFormat::Ply,
            format!("index count {} is not a multiple of 3", buffer.indices.len()),
        ));
    }
    if buffer.normals.len() != buffer.vertices.len() {
        return Err(ScanError::encoding(
            ExportFormat::Ply,
            format!(
                "{} normals for {} vertices",
                buffer.normals.len(),
                buffer.vertices.len()
            ),
        ));
    }

    let mut out = String::new();
    out.push_str("ply\nformat ascii 1.0\n");
    out.push_str(&format!("element vertex {}\n", buffer.vertices.len()));
    out.push_str("property float x\nproperty float y\nproperty float z\n");
    out.push_str("property float nx\nproperty float ny\nproperty float nz\n");
    out.push_str(&format!("element face {}\n", buffer.indices.len() / 3));
    out.push_str("property list uchar int vertex_indices\nend_header\n");

    for (vertex, normal) in buffer.vertices.iter().zip(&buffer.normals) {
        out.push_str(&format!(
            "{} {} {} {} {} {}\n",
            vertex.x, vertex.y, vertex.z, normal.x, normal.y, normal.z
        ));
    }

    for face in buffer.indices.chunks_exact(3) {
        out.push_str(&format!("3 {} {} {}\n", face[0], face[1], face[2]));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn triangle() -> GeometryBuffer {
        GeometryBuffer {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            normals: vec![Vector3::new(0.0, 0.0, 1.0); 3],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_header_counts_match_buffer() {
        let ply = encode_ply(&triangle()).unwrap();
        let lines: Vec<&str> = ply.lines().collect();

        assert_eq!(lines[0], "ply");
        assert_eq!(lines[1], "format ascii 1.0");
        assert_eq!(lines[2], "element vertex 3");
        assert_eq!(lines[3], "property float x");
        assert_eq!(lines[4], "property float y");
        assert_eq!(lines[5], "property float z");
        assert_eq!(lines[6], "property float nx");
        assert_eq!(lines[7], "property float ny");
        assert_eq!(lines[8], "property float nz");
        assert_eq!(lines[9], "element face 1");
        assert_eq!(lines[10], "property list uchar int vertex_indices");
        assert_eq!(lines[11], "end_header");
        assert_eq!(lines.last(), Some(&"3 0 1 2"));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let buffer = triangle();
        assert_eq!(
            encode_ply(&buffer).unwrap().into_bytes(),
            encode_ply(&buffer).unwrap().into_bytes()
        );
    }

    #[test]
    fn test_empty_buffer_encodes_zero_counts() {
        let ply = encode_ply(&GeometryBuffer::new()).unwrap();
        assert!(ply.contains("element vertex 0\n"));
        assert!(ply.contains("element face 0\n"));
        assert!(ply.ends_with("end_header\n"));
    }

    #[test]
    fn test_dangling_indices_are_rejected() {
        let mut buffer = triangle();
        buffer.indices.push(0);

        let result = encode_ply(&buffer);
        assert!(matches!(
            result,
            Err(ScanError::Encoding {
                format: ExportFormat::Ply,
                ..
            })
        ));
    }

    #[test]
    fn test_normal_count_mismatch_is_rejected() {
        let mut buffer = triangle();
        buffer.normals.pop();

        assert!(encode_ply(&buffer).is_err());
    }
}
