// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Fragment accumulation and snapshotting

use super::GeometryBuffer;
use crate::error::ScanError;
use ahash::AHashMap;
use nalgebra::Point3;
use std::sync::RwLock;

/// Identifier of a locally-tracked mesh patch supplied by the capture
/// subsystem.
pub type AnchorId = String;

#[derive(Debug, Default)]
struct AccumulatorState {
    fragments: AHashMap<AnchorId, GeometryBuffer>,
    // Anchor insertion order; re-upserting keeps the original slot so the
    // flattened point list stays deterministic across frames.
    order: Vec<AnchorId>,
    points: Vec<Point3<f32>>,
}

impl AccumulatorState {
    fn recompute_points(&mut self) {
        self.points.clear();
        for anchor in &self.order {
            if let Some(buffer) = self.fragments.get(anchor) {
                self.points.extend_from_slice(&buffer.vertices);
            }
        }
    }
}

/// Latest geometry per active anchor plus a flattened point list for live
/// visualization.
///
/// All methods take `&self`; state lives behind one lock so fragment updates
/// never interleave partially and `snapshot` never observes a half-applied
/// update.
#[derive(Debug, Default)]
pub struct MeshAccumulator {
    state: RwLock<AccumulatorState>,
}

impl MeshAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the buffer for `anchor`.
    ///
    /// A buffer with an out-of-range triangle index is rejected with
    /// `ScanError::MalformedMesh` and the anchor keeps its previous
    /// geometry, if any.
    pub fn upsert_fragment(&self, anchor: &str, buffer: GeometryBuffer) -> Result<(), ScanError> {
        buffer.validate()?;

        let mut state = self.state.write().unwrap();
        if !state.fragments.contains_key(anchor) {
            state.order.push(anchor.to_owned());
        }
        state.fragments.insert(anchor.to_owned(), buffer);
        state.recompute_points();
        Ok(())
    }

    /// Drop the buffer for an anchor the capture subsystem invalidated.
    /// No-op if the anchor was never seen.
    pub fn remove_fragment(&self, anchor: &str) {
        let mut state = self.state.write().unwrap();
        if state.fragments.remove(anchor).is_some() {
            state.order.retain(|id| id != anchor);
            state.recompute_points();
        }
    }

    /// Clear all fragments and flattened points.
    pub fn reset(&self) {
        let mut state = self.state.write().unwrap();
        state.fragments.clear();
        state.order.clear();
        state.points.clear();
    }

    /// Take an immutable copy of the current fragments and point list.
    pub fn snapshot(&self) -> MeshSnapshot {
        let state = self.state.read().unwrap();
        let fragments = state
            .order
            .iter()
            .filter_map(|anchor| {
                state
                    .fragments
                    .get(anchor)
                    .map(|buffer| (anchor.clone(), buffer.clone()))
            })
            .collect();

        MeshSnapshot {
            fragments,
            points: state.points.clone(),
        }
    }

    /// Number of flattened points currently held.
    pub fn point_count(&self) -> usize {
        self.state.read().unwrap().points.len()
    }

    /// Number of active anchors.
    pub fn fragment_count(&self) -> usize {
        self.state.read().unwrap().fragments.len()
    }
}

/// Immutable view of the accumulator at one instant, in anchor-insertion
/// order. Fragments arriving after the snapshot was taken do not appear.
#[derive(Debug, Clone)]
pub struct MeshSnapshot {
    pub fragments: Vec<(AnchorId, GeometryBuffer)>,
    pub points: Vec<Point3<f32>>,
}

impl MeshSnapshot {
    /// Merge all fragments into a single buffer (index-offset concatenation,
    /// fragment order preserved).
    pub fn merged(&self) -> GeometryBuffer {
        let vertex_count = self.fragments.iter().map(|(_, b)| b.vertex_count()).sum();
        let triangle_count = self.fragments.iter().map(|(_, b)| b.triangle_count()).sum();

        let mut merged = GeometryBuffer::with_capacity(vertex_count, triangle_count);
        for (_, buffer) in &self.fragments {
            merged.merge(buffer);
        }
        merged
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
