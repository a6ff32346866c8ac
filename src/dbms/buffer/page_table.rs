use std::collections::HashMap;

use crate::dbms::types::{FrameId, PageId};

/// Maps resident page IDs to the frames holding them.
pub trait IPageTable {
    /// Look up the frame holding a page
    fn find(&self, page_id: PageId) -> Option<FrameId>;
    /// Map a page to a frame, replacing any existing mapping for the page
    fn insert(&mut self, page_id: PageId, frame_id: FrameId);
    /// Drop the mapping for a page, returning the frame it pointed to
    fn remove(&mut self, page_id: PageId) -> Option<FrameId>;
    /// Number of resident pages
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IPageTable for HashMap<PageId, FrameId> {
    fn find(&self, page_id: PageId) -> Option<FrameId> {
        self.get(&page_id).copied()
    }

    fn insert(&mut self, page_id: PageId, frame_id: FrameId) {
        HashMap::insert(self, page_id, frame_id);
    }

    fn remove(&mut self, page_id: PageId) -> Option<FrameId> {
        HashMap::remove(self, &page_id)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}
