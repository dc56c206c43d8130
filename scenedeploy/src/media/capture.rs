//! Capture handshake with the scene renderer.
//!
//! The renderer runs elsewhere and owns the receiving end of a request
//! channel. A recording request carries a one-shot reply channel keyed by an
//! operation id; the flow suspends on that reply instead of polling shared
//! state.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::{MediaError, MediaResult};
use crate::client::{BoxFuture, MediaUpload};

/// Images produced by one recording. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedMedia {
    pub preview: Option<Bytes>,
    pub north: Option<Bytes>,
    pub east: Option<Bytes>,
    pub south: Option<Bytes>,
    pub west: Option<Bytes>,
}

impl CapturedMedia {
    /// All five images, or `None` if any is missing.
    pub fn complete(self) -> Option<MediaUpload> {
        Some(MediaUpload {
            preview: self.preview?,
            north: self.north?,
            east: self.east?,
            south: self.south?,
            west: self.west?,
        })
    }
}

/// A request sent to the renderer.
#[derive(Debug)]
pub enum CaptureRequest {
    /// Record preview media and answer on `reply`.
    Record {
        operation_id: u64,
        reply: oneshot::Sender<CapturedMedia>,
    },
    /// Refresh the editor thumbnail. Nobody waits for this.
    Screenshot,
}

/// Source of freshly recorded preview media.
pub trait MediaCapture: Send + Sync {
    /// Requests a recording and waits for the renderer's reply.
    fn record(&self) -> BoxFuture<'_, MediaResult<CapturedMedia>>;

    /// Signals the renderer to take a thumbnail screenshot.
    fn take_screenshot(&self);
}

/// [`MediaCapture`] over a tokio channel.
pub struct ChannelMediaCapture {
    requests: mpsc::Sender<CaptureRequest>,
    next_operation: AtomicU64,
}

impl ChannelMediaCapture {
    /// Creates the capture handle and the receiver the renderer serves.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<CaptureRequest>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let capture = Self {
            requests: tx,
            next_operation: AtomicU64::new(1),
        };
        (capture, rx)
    }
}

impl MediaCapture for ChannelMediaCapture {
    fn record(&self) -> BoxFuture<'_, MediaResult<CapturedMedia>> {
        Box::pin(async move {
            let operation_id = self.next_operation.fetch_add(1, Ordering::Relaxed);
            let (reply, response) = oneshot::channel();

            self.requests
                .send(CaptureRequest::Record {
                    operation_id,
                    reply,
                })
                .await
                .map_err(|_| MediaError::CaptureUnavailable)?;
            debug!(operation_id, "Requested media recording");

            response
                .await
                .map_err(|_| MediaError::CaptureCancelled { operation_id })
        })
    }

    fn take_screenshot(&self) {
        if self.requests.try_send(CaptureRequest::Screenshot).is_err() {
            debug!("Screenshot request dropped");
        }
    }
}
