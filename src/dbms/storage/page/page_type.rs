use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::dbms::types::{PageData, PageId, PAGE_SIZE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    /// Tried to unpin a page nobody holds
    #[error("pin count of page {0:?} is already zero")]
    PinCountUnderflow(Option<PageId>),
}

/// A frame of the buffer pool and the metadata of the page it currently
/// holds.
///
/// The metadata carries no latch of its own: the buffer pool only touches it
/// while holding its pool-wide lock. The content buffer sits behind a shared
/// latch so that pinned holders can read and write it without that lock.
pub struct Page {
    page_id: Option<PageId>,
    data: Arc<RwLock<PageData>>,
    pin_count: usize,
    is_dirty: bool,
}

impl Page {
    pub fn new(page_id: Option<PageId>) -> Page {
        Page {
            page_id,
            data: Arc::new(RwLock::new([0; PAGE_SIZE])),
            pin_count: 0,
            is_dirty: false,
        }
    }

    /// Get the ID of the page held in this frame, `None` if the frame is free
    pub fn get_page_id(&self) -> Option<PageId> {
        self.page_id
    }

    /// Get a shared handle to the content latch. The buffer pool only ever
    /// `try_*` locks it, pinned holders may block on it.
    pub fn data_latch(&self) -> Arc<RwLock<PageData>> {
        Arc::clone(&self.data)
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn set_dirty(&mut self, is_dirty: bool) {
        self.is_dirty = is_dirty;
    }

    pub fn set_clean(&mut self) {
        self.is_dirty = false;
    }

    pub fn get_pin_count(&self) -> usize {
        self.pin_count
    }

    /// Increase the pin count of the page by 1
    pub fn increase_pin_count(&mut self) {
        self.pin_count += 1;
    }

    /// Decrease the pin count of the page by 1, returning the new count
    pub fn decrease_pin_count(&mut self) -> Result<usize, PageError> {
        if self.pin_count == 0 {
            return Err(PageError::PinCountUnderflow(self.page_id));
        }
        self.pin_count -= 1;
        Ok(self.pin_count)
    }

    /// Hand the frame to another page: new identity, clean, pinned once. The
    /// caller loads the content.
    pub fn assign(&mut self, page_id: PageId) {
        self.page_id = Some(page_id);
        self.is_dirty = false;
        self.pin_count = 1;
    }

    /// Return the frame's metadata to its unassigned state. The caller zeroes
    /// the content.
    pub fn clear(&mut self) {
        self.page_id = None;
        self.is_dirty = false;
        self.pin_count = 0;
    }
}
