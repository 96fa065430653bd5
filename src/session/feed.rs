// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scanforge Inc.

//! Bounded capture feed between the AR callback thread and the session

use super::ScanSession;
use crate::error::ScanError;
use crate::geometry::{AnchorId, GeometryBuffer};
use crossbeam_channel::{bounded, unbounded, Receiver, SendError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One message from the capture subsystem.
#[derive(Debug, Clone)]
pub enum FragmentEvent {
    Updated {
        anchor: AnchorId,
        buffer: GeometryBuffer,
    },
    Removed {
        anchor: AnchorId,
    },
}

/// Queued fragment intake for a [`ScanSession`].
///
/// The producer (the platform capture callback) pushes events into a
/// bounded channel; a single consumer thread applies them to the session in
/// send order, so no two updates interleave. Fragment errors are forwarded
/// to an error channel rather than dropped.
#[derive(Debug)]
pub struct CaptureFeed {
    events: Option<Sender<FragmentEvent>>,
    errors: Receiver<ScanError>,
    consumer: Option<JoinHandle<()>>,
}

impl CaptureFeed {
    /// Start the consumer thread over a channel holding at most `capacity`
    /// in-flight events.
    pub fn spawn(session: Arc<ScanSession>, capacity: usize) -> Self {
        let (event_tx, event_rx) = bounded::<FragmentEvent>(capacity);
        let (error_tx, error_rx) = unbounded();

        let consumer = thread::spawn(move || {
            for event in event_rx {
                let result = match event {
                    FragmentEvent::Updated { anchor, buffer } => {
                        session.on_fragment_update(&anchor, buffer)
                    }
                    FragmentEvent::Removed { anchor } => {
                        session.remove_fragment(&anchor);
                        Ok(())
                    }
                };

                if let Err(error) = result {
                    // The receiver may already be gone during teardown.
                    let _ = error_tx.send(error);
                }
            }
        });

        Self {
            events: Some(event_tx),
            errors: error_rx,
            consumer: Some(consumer),
        }
    }

    /// Queue one event, blocking while the channel is full.
    pub fn send(&self, event: FragmentEvent) -> Result<(), SendError<FragmentEvent>> {
        self.events
            .as_ref()
            .expect("feed already shut down")
            .send(event)
    }

    /// Clonable producer handle for the capture subsystem.
    pub fn sender(&self) -> Sender<FragmentEvent> {
        self.events
            .as_ref()
            .expect("feed already shut down")
            .clone()
    }

    /// Pop the next fragment error surfaced by the consumer, if any.
    pub fn try_next_error(&self) -> Option<ScanError> {
        self.errors.try_recv().ok()
    }

    /// Disconnect the producer side and wait for queued events to be
    /// applied. Sender clones handed out via [`CaptureFeed::sender`] must be
    /// dropped first or the join will wait on them.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.events.take();
        if let Some(handle) = self.consumer.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureFeed {
    fn drop(&mut self) {
        self.close();
    }
}
