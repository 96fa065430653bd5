// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! GLB (binary glTF) encoder

use super::ExportFormat;
use crate::error::ScanError;
use crate::geometry::GeometryBuffer;
use serde_json::json;

/// Encode a merged buffer as a GLB container: one mesh primitive with
/// per-vertex positions and normals plus a u32 triangle index list.
pub fn encode_glb(buffer: &GeometryBuffer) -> Result<Vec<u8>, ScanError> {
    if buffer.vertices.is_empty() {
        return Err(ScanError::encoding(ExportFormat::Glb, "empty mesh"));
    }
    if buffer.normals.len() != buffer.vertices.len() {
        return Err(ScanError::encoding(
            ExportFormat::Glb,
            format!(
                "{} normals for {} vertices",
                buffer.normals.len(),
                buffer.vertices.len()
            ),
        ));
    }

    let (gltf_json_val, buffer_data) = create_gltf_json(buffer);

    let json_string = serde_json::to_string(&gltf_json_val)
        .map_err(|e| ScanError::encoding(ExportFormat::Glb, e.to_string()))?;
    let mut json_length = json_string.len();
    align_to_multiple_of_four(&mut json_length);
    let json_padding = json_length - json_string.len();

    let mut bin_length = buffer_data.len();
    align_to_multiple_of_four(&mut bin_length);
    let bin_padding = bin_length - buffer_data.len();

    let total_length = 12 + 8 + json_length + 8 + bin_length;

    let mut out = Vec::with_capacity(total_length);

    // GLB header
    out.extend_from_slice(&0x46546C67u32.to_le_bytes()); // magic: "glTF"
    out.extend_from_slice(&2u32.to_le_bytes()); // version
    out.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk
    out.extend_from_slice(&(json_length as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // type: "JSON"
    out.extend_from_slice(json_string.as_bytes());
    out.extend(std::iter::repeat(b' ').take(json_padding));

    // BIN chunk
    out.extend_from_slice(&(bin_length as u32).to_le_bytes());
    out.extend_from_slice(&0x004E4942u32.to_le_bytes()); // type: "BIN\0"
    out.extend_from_slice(&buffer_data);
    out.extend(std::iter::repeat(0u8).take(bin_padding));

    Ok(out)
}

fn create_gltf_json(buffer: &GeometryBuffer) -> (serde_json::Value, Vec<u8>) {
    let mut buffer_data = Vec::new();

    // Write positions
    let position_offset = buffer_data.len();
    let (min_pos, max_pos) = calculate_bounds(buffer);
    for vertex in &buffer.vertices {
        buffer_data.extend_from_slice(&vertex.x.to_le_bytes());
        buffer_data.extend_from_slice(&vertex.y.to_le_bytes());
        buffer_data.extend_from_slice(&vertex.z.to_le_bytes());
    }
    let position_length = buffer_data.len() - position_offset;

    // Write normals
    let normal_offset = buffer_data.len();
    for normal in &buffer.normals {
        buffer_data.extend_from_slice(&normal.x.to_le_bytes());
        buffer_data.extend_from_slice(&normal.y.to_le_bytes());
        buffer_data.extend_from_slice(&normal.z.to_le_bytes());
    }
    let normal_length = buffer_data.len() - normal_offset;

    // Write indices
    let indices_offset = buffer_data.len();
    for &index in &buffer.indices {
        buffer_data.extend_from_slice(&index.to_le_bytes());
    }
    let indices_length = buffer_data.len() - indices_offset;

    let gltf = json!({
        "asset": {
            "generator": "Scanforge",
            "version": "2.0"
        },
        "scene": 0,
        "scenes": [
            {
                "nodes": [0]
            }
        ],
        "nodes": [
            {
                "mesh": 0
            }
        ],
        "meshes": [
            {
                "primitives": [
                    {
                        "attributes": {
                            "POSITION": 0,
                            "NORMAL": 1
                        },
                        "indices": 2,
                        "mode": 4
                    }
                ]
            }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "byteOffset": 0,
                "componentType": 5126,
                "count": buffer.vertices.len(),
                "type": "VEC3",
                "min": [min_pos[0], min_pos[1], min_pos[2]],
                "max": [max_pos[0], max_pos[1], max_pos[2]]
            },
            {
                "bufferView": 1,
                "byteOffset": 0,
                "componentType": 5126,
                "count": buffer.vertices.len(),
                "type": "VEC3"
            },
            {
                "bufferView": 2,
                "byteOffset": 0,
                "componentType": 5125,
                "count": buffer.indices.len(),
                "type": "SCALAR"
            }
        ],
        "bufferViews": [
            {
                "buffer": 0,
                "byteOffset": position_offset,
                "byteLength": position_length,
                "target": 34962
            },
            {
                "buffer": 0,
                "byteOffset": normal_offset,
                "byteLength": normal_length,
                "target": 34962
            },
            {
                "buffer": 0,
                "byteOffset": indices_offset,
                "byteLength": indices_length,
                "target": 34963
            }
        ],
        "buffers": [
            {
                "byteLength": buffer_data.len()
            }
        ]
    });

    (gltf, buffer_data)
}

fn calculate_bounds(buffer: &GeometryBuffer) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX, f32::MAX, f32::MAX];
    let mut max = [f32::MIN, f32::MIN, f32::MIN];

    for vertex in &buffer.vertices {
        min[0] = min[0].min(vertex.x);
        min[1] = min[1].min(vertex.y);
        min[2] = min[2].min(vertex.z);
        max[0] = max[0].max(vertex.x);
        max[1] = max[1].max(vertex.y);
        max[2] = max[2].max(vertex.z);
    }

    (min, max)
}

fn align_to_multiple_of_four(n: &mut usize) {
    *n = (*n + 3) & !3;
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
    fn test_glb_header() {
        let glb = encode_glb(&triangle()).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(glb[4..8].try_into().unwrap()), 2);
        assert_eq!(
            u32::from_le_bytes(glb[8..12].try_into().unwrap()) as usize,
            glb.len()
        );
    }

    #[test]
    fn test_chunks_are_four_byte_aligned() {
        let glb = encode_glb(&triangle()).unwrap();

        let json_length = u32::from_le_bytes(glb[12..16].try_into().unwrap()) as usize;
        assert_eq!(json_length % 4, 0);
        assert_eq!(&glb[16..20], b"JSON");

        let bin_header = 12 + 8 + json_length;
        let bin_length =
            u32::from_le_bytes(glb[bin_header..bin_header + 4].try_into().unwrap()) as usize;
        assert_eq!(bin_length % 4, 0);
    }

    #[test]
    fn test_bin_chunk_holds_positions_normals_indices() {
        let buffer = triangle();
        let glb = encode_glb(&buffer).unwrap();

        let json_length = u32::from_le_bytes(glb[12..16].try_into().unwrap()) as usize;
        let bin_start = 12 + 8 + json_length + 8;
        let expected = buffer.vertices.len() * 12 * 2 + buffer.indices.len() * 4;
        assert!(glb.len() - bin_start >= expected);
    }

    #[test]
    fn test_positions_round_trip_through_bin_chunk() {
        use approx::assert_relative_eq;

        let buffer = triangle();
        let glb = encode_glb(&buffer).unwrap();

        let json_length = u32::from_le_bytes(glb[12..16].try_into().unwrap()) as usize;
        let bin_start = 12 + 8 + json_length + 8;

        for (i, vertex) in buffer.vertices.iter().enumerate() {
            let offset = bin_start + i * 12;
            let x = f32::from_le_bytes(glb[offset..offset + 4].try_into().unwrap());
            let y = f32::from_le_bytes(glb[offset + 4..offset + 8].try_into().unwrap());
            let z = f32::from_le_bytes(glb[offset + 8..offset + 12].try_into().unwrap());
            assert_relative_eq!(x, vertex.x);
            assert_relative_eq!(y, vertex.y);
            assert_relative_eq!(z, vertex.z);
        }
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let result = encode_glb(&GeometryBuffer::new());
        assert!(matches!(
            result,
            Err(ScanError::Encoding {
                format: ExportFormat::Glb,
                ..
            })
        ));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let buffer = triangle();
        assert_eq!(encode_glb(&buffer).unwrap(), encode_glb(&buffer).unwrap());
    }
}
