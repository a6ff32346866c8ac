use thiserror::Error;

use crate::dbms::types::FrameId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferPoolReplacerError {
    /// Frame is out of range
    #[error("{0}")]
    FrameOutOfRange(String),
}

/// Tracks the frames that may be evicted and picks which one goes next.
///
/// Implementations synchronise internally, so every method takes `&self`.
pub trait IBufferPoolReplacer {
    /// Mark a frame as an eviction candidate, after its pin count drops to
    /// zero.
    fn insert(&self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError>;
    /// Select a frame to remove from the buffer pool, returning the ID of the
    /// removed frame. If no frame is tracked, return `None`.
    fn victim(&self) -> Result<Option<FrameId>, BufferPoolReplacerError>;
    /// Stop tracking a frame, e.g. after it gets pinned again. Returns whether
    /// the frame was tracked.
    fn erase(&self, frame_id: FrameId) -> Result<bool, BufferPoolReplacerError>;
    /// Return the number of frames currently in the replacer.
    fn size(&self) -> Result<usize, BufferPoolReplacerError>;
}

pub(super) fn check_frame_range(
    frame_id: FrameId,
    capacity: usize,
) -> Result<(), BufferPoolReplacerError> {
    if frame_id >= capacity {
        return Err(BufferPoolReplacerError::FrameOutOfRange(format!(
            "frame_id {} is out of range",
            frame_id
        )));
    }
    Ok(())
}
