// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Session module - scan orchestration and capture feed

mod controller;
mod feed;

pub use controller::{ScanSession, ScanState};
pub use feed::{CaptureFeed, FragmentEvent};
