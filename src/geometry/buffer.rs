// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Geometry buffer produced by a scan fragment

use crate::error::ScanError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex positions, normals, and triangle indices for one mesh fragment.
///
/// `normals` is index-aligned with `vertices` (`normals[i]` belongs to
/// `vertices[i]`) and `indices` names triangles as consecutive triples of
/// vertex indices. Each anchor update replaces its buffer wholesale; buffers
/// are never patched in place across frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryBuffer {
    pub vertices: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub indices: Vec<u32>,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(triangle_count * 3),
        }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check that every triangle index names an existing vertex.
    ///
    /// Returns `ScanError::MalformedMesh` for the first out-of-range index;
    /// a buffer that fails here must not reach the accumulator or an encoder.
    pub fn validate(&self) -> Result<(), ScanError> {
        let vertex_count = self.vertices.len();
        for &index in &self.indices {
            if index as usize >= vertex_count {
                return Err(ScanError::MalformedMesh {
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Merge with another buffer (index-offset concatenation)
    pub fn merge(&mut self, other: &GeometryBuffer) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);

        for &index in &other.indices {
            self.indices.push(index + offset);
        }
    }
}

impl Default for GeometryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
