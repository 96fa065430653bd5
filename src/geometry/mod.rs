// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Geometry module - scan buffers and fragment accumulation

mod accumulator;
mod buffer;

pub use accumulator::{AnchorId, MeshAccumulator, MeshSnapshot};
pub use buffer::GeometryBuffer;
