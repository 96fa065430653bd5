// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Scan session state machine

use crate::error::ScanError;
use crate::geometry::{GeometryBuffer, MeshAccumulator, MeshSnapshot};
use crate::io::ExportFormat;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Capture state of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Stopped,
}

/// Orchestrates capture start/stop, fragment accumulation, and export.
///
/// All methods take `&self` so a session can be shared between the UI
/// thread and the capture thread behind an `Arc`. No error leaves the
/// session unusable.
#[derive(Debug)]
pub struct ScanSession {
    accumulator: Arc<MeshAccumulator>,
    state: RwLock<ScanState>,
    has_result: AtomicBool,
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            accumulator: Arc::new(MeshAccumulator::new()),
            state: RwLock::new(ScanState::Idle),
            has_result: AtomicBool::new(false),
        }
    }

    /// Begin capturing. Discards any previous scan's fragments and result
    /// flag, from `Idle` and `Stopped` alike.
    pub fn start(&self) {
        self.accumulator.reset();
        self.has_result.store(false, Ordering::Release);
        *self.state.write().unwrap() = ScanState::Scanning;
    }

    /// Feed one anchor update from the capture subsystem.
    ///
    /// Ignored outside `Scanning`. A malformed fragment is rejected with
    /// `ScanError::MalformedMesh` and the scan continues; the anchor keeps
    /// its previous geometry.
    pub fn on_fragment_update(
        &self,
        anchor: &str,
        buffer: GeometryBuffer,
    ) -> Result<(), ScanError> {
        if *self.state.read().unwrap() != ScanState::Scanning {
            return Ok(());
        }
        self.accumulator.upsert_fragment(anchor, buffer)
    }

    /// Drop an anchor the capture subsystem invalidated. Ignored outside
    /// `Scanning`.
    pub fn remove_fragment(&self, anchor: &str) {
        if *self.state.read().unwrap() != ScanState::Scanning {
            return;
        }
        self.accumulator.remove_fragment(anchor);
    }

    /// Freeze fragment intake and return the captured point count.
    ///
    /// Returns `ScanError::NoDataCaptured` when nothing was collected; the
    /// session still transitions to `Stopped` and stays usable.
    pub fn stop(&self) -> Result<usize, ScanError> {
        *self.state.write().unwrap() = ScanState::Stopped;

        let points = self.accumulator.point_count();
        if points == 0 {
            return Err(ScanError::NoDataCaptured);
        }

        self.has_result.store(true, Ordering::Release);
        Ok(points)
    }

    /// Merge all captured fragments and write them to `path` in `format`.
    ///
    /// Takes a consistent snapshot at call time; fragments arriving later
    /// do not retroactively appear in the output. Fails with
    /// `ScanError::NoMeshAvailable` before a successful `stop()`. Nothing
    /// is written when encoding fails.
    pub fn export(&self, format: ExportFormat, path: impl AsRef<Path>) -> Result<(), ScanError> {
        if !self.has_result() {
            return Err(ScanError::NoMeshAvailable);
        }

        let merged = self.accumulator.snapshot().merged();
        crate::export_mesh(&merged, format, path)
    }

    /// Immutable copy of the current fragments and point list.
    pub fn snapshot(&self) -> MeshSnapshot {
        self.accumulator.snapshot()
    }

    pub fn state(&self) -> ScanState {
        *self.state.read().unwrap()
    }

    /// True once at least one fragment was captured and the session was
    /// stopped.
    pub fn has_result(&self) -> bool {
        self.has_result.load(Ordering::Acquire)
    }

    /// Number of flattened points currently held, for live display.
    pub fn point_count(&self) -> usize {
        self.accumulator.point_count()
    }

    pub fn accumulator(&self) -> &Arc<MeshAccumulator> {
        &self.accumulator
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn fragment() -> GeometryBuffer {
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

    fn malformed() -> GeometryBuffer {
        GeometryBuffer {
            vertices: vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            normals: vec![Vector3::new(0.0, 0.0, 1.0); 2],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_updates_ignored_before_start() {
        let session = ScanSession::new();
        session.on_fragment_update("a", fragment()).unwrap();

        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(session.point_count(), 0);
    }

    #[test]
    fn test_updates_ignored_after_stop() {
        let session = ScanSession::new();
        session.start();
        session.on_fragment_update("a", fragment()).unwrap();
        session.stop().unwrap();

        session.on_fragment_update("b", fragment()).unwrap();
        assert_eq!(session.point_count(), 3);
    }

    #[test]
    fn test_stop_with_no_data() {
        let session = ScanSession::new();
        session.start();

        assert!(matches!(session.stop(), Err(ScanError::NoDataCaptured)));
        assert!(!session.has_result());
        assert_eq!(session.state(), ScanState::Stopped);
    }

    #[test]
    fn test_stop_reports_point_count() {
        let session = ScanSession::new();
        session.start();
        session.on_fragment_update("a", fragment()).unwrap();

        assert_eq!(session.stop().unwrap(), 3);
        assert!(session.has_result());
    }

    #[test]
    fn test_export_before_any_scan() {
        let session = ScanSession::new();
        let target = tempfile::NamedTempFile::new().unwrap();

        let result = session.export(ExportFormat::Ply, target.path());
        assert!(matches!(result, Err(ScanError::NoMeshAvailable)));
    }

    #[test]
    fn test_malformed_fragment_does_not_abort_scan() {
        let session = ScanSession::new();
        session.start();

        assert!(session.on_fragment_update("noisy", malformed()).is_err());
        session.on_fragment_update("good", fragment()).unwrap();

        assert_eq!(session.stop().unwrap(), 3);
    }

    #[test]
    fn test_restart_discards_previous_result() {
        let session = ScanSession::new();
        session.start();
        session.on_fragment_update("a", fragment()).unwrap();
        session.stop().unwrap();

        session.start();
        assert_eq!(session.state(), ScanState::Scanning);
        assert!(!session.has_result());
        assert_eq!(session.point_count(), 0);
    }

    #[test]
    fn test_export_writes_requested_format() {
        let session = ScanSession::new();
        session.start();
        session.on_fragment_update("a", fragment()).unwrap();
        session.stop().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.ply");
        session.export(ExportFormat::Ply, &path).unwrap();

        let ply = std::fs::read_to_string(&path).unwrap();
        assert!(ply.starts_with("ply\n"));
        assert!(ply.contains("element vertex 3\n"));
    }
}
