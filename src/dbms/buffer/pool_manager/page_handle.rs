use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dbms::types::{FrameId, PageData, PageId};

/// A pinned page handed out by the buffer pool.
///
/// The handle does not unpin on drop: every successful fetch or new must be
/// matched by an `unpin_page` call. Writing through the handle does not mark
/// the page dirty either, pass `mark_dirty` when unpinning instead.
///
/// The content latch only serialises holders of the same page against each
/// other. The pool never waits on it: flushing or deleting a page whose latch
/// is held fails with `PageLatched` instead.
///
/// A handle stays valid only while the page is pinned. Once `unpin_page` is
/// called the frame behind it may be evicted and reused for another page, and
/// the handle then reads and writes that page's content. Holding a guard from
/// such a stale handle makes every reuse of the frame fail with
/// `FrameLatched` until the guard is dropped.
#[derive(Clone)]
pub struct PageHandle {
    page_id: PageId,
    frame_id: FrameId,
    data: Arc<RwLock<PageData>>,
}

impl PageHandle {
    pub(super) fn new(page_id: PageId, frame_id: FrameId, data: Arc<RwLock<PageData>>) -> Self {
        Self {
            page_id,
            frame_id,
            data,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Frame the page is resident in. Only meaningful while the page is
    /// pinned, see the type docs.
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, PageData> {
        self.data.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, PageData> {
        self.data.write()
    }

    /// Copy `data` into the page starting at `offset`.
    ///
    /// # Panics
    ///
    /// If the write runs past the end of the page.
    pub fn write_data(&self, offset: usize, data: &[u8]) {
        self.write()[offset..offset + data.len()].copy_from_slice(data);
    }
}

impl std::fmt::Debug for PageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHandle")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.frame_id)
            .finish()
    }
}
