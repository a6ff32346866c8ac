use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::{debug, trace, warn};
use parking_lot::Mutex;
use thiserror::Error;

use crate::dbms::buffer::config::BufferPoolConfig;
use crate::dbms::buffer::replacer::BufferPoolReplacerError;
use crate::dbms::buffer::types::{DiskManagerGeneric, PageTableGeneric, ReplacerGeneric};
use crate::dbms::storage::disk::DiskManagerError;
use crate::dbms::storage::page::{Page, PageError};
use crate::dbms::types::{FrameId, PageData, PageId, INVALID_PAGE_ID, PAGE_SIZE};

use super::PageHandle;

#[derive(Debug, Error)]
pub enum BufferPoolManagerError {
    /// Every frame is pinned, nothing can be evicted
    #[error("no frame available: every frame in the buffer pool is pinned")]
    NoFrameAvailable,
    /// The requested page is not in the buffer pool
    #[error("page {0} is not in the buffer pool")]
    PageNotInPool(PageId),
    /// A page is in use, e.g. when it's trying to be deleted
    #[error("page {0} is pinned")]
    PageInUse(PageId),
    /// Unpinning a page whose pin count is already zero
    #[error("page {0} is not pinned")]
    PageNotPinned(PageId),
    #[error("the invalid page ID cannot be used")]
    InvalidPageId,
    /// A holder of the page has its content latched exclusively
    #[error("page {0} is latched by a holder")]
    PageLatched(PageId),
    /// A handle left over from an earlier page has the victim frame latched
    #[error("frame {0} is latched and cannot be reused")]
    FrameLatched(FrameId),
    #[error(transparent)]
    ReplacerError(#[from] BufferPoolReplacerError),
    #[error(transparent)]
    PageError(#[from] PageError),
    #[error(transparent)]
    DiskManagerError(#[from] DiskManagerError),
}

pub trait IBufferPoolManager {
    /// Fetch the requested page from the buffer pool, reading it from disk if
    /// it is not resident. The page comes back pinned.
    fn fetch_page(&self, page_id: PageId) -> Result<PageHandle, BufferPoolManagerError>;
    /// Allocate a new page on disk and pin it in a zeroed frame.
    fn new_page(&self) -> Result<PageHandle, BufferPoolManagerError>;
    /// Unpin the target page, setting its dirty flag to `mark_dirty`.
    fn unpin_page(&self, page_id: PageId, mark_dirty: bool) -> Result<(), BufferPoolManagerError>;
    /// Write the target page to disk if it is dirty.
    fn flush_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError>;
    /// Deletes a page from the buffer pool and deallocates it on disk.
    fn delete_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError>;
    /// Flushes all the dirty pages in the buffer pool to disk.
    fn flush_all_pages(&self) -> Result<(), BufferPoolManagerError>;
}

/// Where a victim frame was taken from, so it can be put back if reusing it
/// fails.
#[derive(Debug, Clone, Copy, PartialEq)]
enum VictimSource {
    FreeList,
    Replacer,
}

/// What to load into a victim frame
enum FrameLoad {
    /// A page already read from disk
    Read(PageId, Box<PageData>),
    /// A freshly allocated, zeroed page
    Allocate,
}

struct BufferPoolState {
    pages: Vec<Page>,
    /// page_id -> frame_id
    page_table: PageTableGeneric,
    replacer: ReplacerGeneric,
    free_frames: VecDeque<FrameId>,
    disk_manager: DiskManagerGeneric,
}

/// Caches disk pages in a fixed number of frames.
///
/// All pool state sits behind a single latch that is held for the whole of
/// each operation, disk I/O included, so operations are fully serialised.
/// While holding it the pool only ever tries a frame's content latch, so a
/// caller holding a page guard can call back into the pool without
/// deadlocking. Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct BufferPoolManager {
    pool_size: usize,
    state: Arc<Mutex<BufferPoolState>>,
}

impl BufferPoolManager {
    pub fn new(
        pool_size: usize,
        replacer: ReplacerGeneric,
        disk_manager: DiskManagerGeneric,
    ) -> BufferPoolManager {
        BufferPoolManager {
            pool_size,
            state: Arc::new(Mutex::new(BufferPoolState {
                // Fill frames with uninitialized pages with no page IDs
                pages: (0..pool_size).map(|_| Page::new(None)).collect(),
                page_table: Box::new(HashMap::<PageId, FrameId>::new()),
                replacer,
                // All frames are free
                free_frames: (0..pool_size).collect(),
                disk_manager,
            })),
        }
    }

    pub fn with_config(config: BufferPoolConfig, disk_manager: DiskManagerGeneric) -> Self {
        let replacer = config.replacer.build(config.pool_size);
        Self::new(config.pool_size, replacer, disk_manager)
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Pin count of a resident page, `None` if the page is not resident
    pub fn pin_count(&self, page_id: PageId) -> Option<usize> {
        let state = self.state.lock();
        let frame_id = state.page_table.find(page_id)?;
        Some(state.pages[frame_id].get_pin_count())
    }

    /// Dirty flag of a resident page, `None` if the page is not resident
    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        let state = self.state.lock();
        let frame_id = state.page_table.find(page_id)?;
        Some(state.pages[frame_id].is_dirty())
    }

    /// Number of frames that have never been assigned or were freed by a
    /// delete
    pub fn free_frame_count(&self) -> usize {
        self.state.lock().free_frames.len()
    }

    /// Number of resident pages that could be evicted right now
    pub fn evictable_count(&self) -> Result<usize, BufferPoolManagerError> {
        Ok(self.state.lock().replacer.size()?)
    }
}

impl BufferPoolState {
    fn handle(&self, page_id: PageId, frame_id: FrameId) -> PageHandle {
        PageHandle::new(page_id, frame_id, self.pages[frame_id].data_latch())
    }

    /// Pick a frame to (re)use, always from the free list first.
    fn get_victim_frame(&mut self) -> Result<(FrameId, VictimSource), BufferPoolManagerError> {
        if let Some(frame_id) = self.free_frames.pop_front() {
            debug_assert!(self.pages[frame_id].get_page_id().is_none());
            return Ok((frame_id, VictimSource::FreeList));
        }

        match self.replacer.victim()? {
            Some(frame_id) => {
                debug_assert_eq!(self.pages[frame_id].get_pin_count(), 0);
                Ok((frame_id, VictimSource::Replacer))
            }
            None => {
                warn!("buffer pool exhausted: all {} frames are pinned", self.pages.len());
                Err(BufferPoolManagerError::NoFrameAvailable)
            }
        }
    }

    /// Hand a victim back to where it came from, untouched.
    fn restore_victim(
        &mut self,
        frame_id: FrameId,
        source: VictimSource,
    ) -> Result<(), BufferPoolManagerError> {
        match source {
            VictimSource::FreeList => self.free_frames.push_front(frame_id),
            VictimSource::Replacer => self.replacer.insert(frame_id)?,
        }
        Ok(())
    }

    fn write_back(
        &mut self,
        frame_id: FrameId,
        page_id: PageId,
        data: &PageData,
    ) -> Result<(), BufferPoolManagerError> {
        if let Err(e) = self.disk_manager.write_page(page_id, &data[..]) {
            warn!("failed to write page {} to disk: {}", page_id, e);
            return Err(e.into());
        }
        self.pages[frame_id].set_clean();
        debug!("wrote page {} from frame {} to disk", page_id, frame_id);

        Ok(())
    }

    /// Write a page to disk if it's dirty. Never waits on the content latch:
    /// if a holder has it write-locked the page stays dirty.
    fn write_if_dirty(&mut self, frame_id: FrameId) -> Result<(), BufferPoolManagerError> {
        let page = &self.pages[frame_id];
        let page_id = match page.get_page_id() {
            Some(page_id) if page.is_dirty() => page_id,
            _ => return Ok(()),
        };

        let latch = page.data_latch();
        let data = match latch.try_read() {
            Some(data) => data,
            None => {
                warn!("page {} is latched by a holder, not writing it", page_id);
                return Err(BufferPoolManagerError::PageLatched(page_id));
            }
        };
        self.write_back(frame_id, page_id, &data)
    }

    /// Load a victim frame with a page, writing back what it held before.
    ///
    /// The frame's content latch is only tried, never waited on. Any failure
    /// hands the victim back untouched.
    fn reuse_victim(
        &mut self,
        frame_id: FrameId,
        source: VictimSource,
        load: FrameLoad,
    ) -> Result<PageId, BufferPoolManagerError> {
        let latch = self.pages[frame_id].data_latch();
        let mut data = match latch.try_write() {
            Some(data) => data,
            None => {
                warn!("frame {} is latched by a stale handle, cannot reuse it", frame_id);
                self.restore_victim(frame_id, source)?;
                return Err(BufferPoolManagerError::FrameLatched(frame_id));
            }
        };

        let old_page_id = self.pages[frame_id].get_page_id();
        if let Some(old_page_id) = old_page_id {
            if self.pages[frame_id].is_dirty() {
                if let Err(e) = self.write_back(frame_id, old_page_id, &data) {
                    self.restore_victim(frame_id, source)?;
                    return Err(e);
                }
            }
        }

        let page_id = match load {
            FrameLoad::Read(page_id, content) => {
                *data = *content;
                page_id
            }
            FrameLoad::Allocate => {
                let page_id = match self.disk_manager.allocate_page() {
                    Ok(page_id) => page_id,
                    Err(e) => {
                        warn!("failed to allocate a page: {}", e);
                        self.restore_victim(frame_id, source)?;
                        return Err(e.into());
                    }
                };
                debug_assert_ne!(page_id, INVALID_PAGE_ID);
                *data = [0; PAGE_SIZE];
                page_id
            }
        };
        drop(data);

        if let Some(old_page_id) = old_page_id {
            debug!("evicting page {} from frame {}", old_page_id, frame_id);
            self.page_table.remove(old_page_id);
        }
        debug_assert!(self.page_table.find(page_id).is_none());

        self.page_table.insert(page_id, frame_id);
        self.pages[frame_id].assign(page_id);

        Ok(page_id)
    }

    fn fetch_page(&mut self, page_id: PageId) -> Result<PageHandle, BufferPoolManagerError> {
        if let Some(frame_id) = self.page_table.find(page_id) {
            self.replacer.erase(frame_id)?;
            self.pages[frame_id].increase_pin_count();
            trace!("page {} hit in frame {}", page_id, frame_id);
            return Ok(self.handle(page_id, frame_id));
        }

        if self.free_frames.is_empty() && self.replacer.size()? == 0 {
            warn!("buffer pool exhausted: all {} frames are pinned", self.pages.len());
            return Err(BufferPoolManagerError::NoFrameAvailable);
        }

        // Read before choosing a victim so a failed read leaves nothing to undo
        let data = self.disk_manager.read_page(page_id).map_err(|e| {
            warn!("failed to read page {} from disk: {}", page_id, e);
            e
        })?;

        let (frame_id, source) = self.get_victim_frame()?;
        self.reuse_victim(frame_id, source, FrameLoad::Read(page_id, Box::new(data)))?;
        trace!("page {} loaded into frame {}", page_id, frame_id);

        Ok(self.handle(page_id, frame_id))
    }

    fn new_page(&mut self) -> Result<PageHandle, BufferPoolManagerError> {
        // No frame, no allocation
        let (frame_id, source) = self.get_victim_frame()?;
        let page_id = self.reuse_victim(frame_id, source, FrameLoad::Allocate)?;
        debug!("allocated page {} in frame {}", page_id, frame_id);

        Ok(self.handle(page_id, frame_id))
    }

    fn unpin_page(&mut self, page_id: PageId, mark_dirty: bool) -> Result<(), BufferPoolManagerError> {
        let frame_id = self
            .page_table
            .find(page_id)
            .ok_or(BufferPoolManagerError::PageNotInPool(page_id))?;
        let page = &mut self.pages[frame_id];

        if page.get_pin_count() == 0 {
            return Err(BufferPoolManagerError::PageNotPinned(page_id));
        }

        page.set_dirty(mark_dirty);
        if page.decrease_pin_count()? == 0 {
            self.replacer.insert(frame_id)?;
        }
        trace!("unpinned page {} (dirty: {})", page_id, mark_dirty);

        Ok(())
    }

    fn flush_page(&mut self, page_id: PageId) -> Result<(), BufferPoolManagerError> {
        let frame_id = self
            .page_table
            .find(page_id)
            .ok_or(BufferPoolManagerError::PageNotInPool(page_id))?;

        self.write_if_dirty(frame_id)
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<(), BufferPoolManagerError> {
        let frame_id = self.page_table.find(page_id);

        if let Some(frame_id) = frame_id {
            if self.pages[frame_id].get_pin_count() > 0 {
                return Err(BufferPoolManagerError::PageInUse(page_id));
            }
        }

        // An unpinned page can still be latched through a handle kept past
        // its unpin
        let latch = frame_id.map(|frame_id| self.pages[frame_id].data_latch());
        let data = match latch.as_ref() {
            Some(latch) => match latch.try_write() {
                Some(data) => Some(data),
                None => {
                    warn!("page {} is latched by a holder, not deleting it", page_id);
                    return Err(BufferPoolManagerError::PageLatched(page_id));
                }
            },
            None => None,
        };

        // Deallocate first: past this point nothing can fail halfway
        if let Err(e) = self.disk_manager.deallocate_page(page_id) {
            warn!("failed to deallocate page {}: {}", page_id, e);
            return Err(e.into());
        }

        if let (Some(frame_id), Some(mut data)) = (frame_id, data) {
            *data = [0; PAGE_SIZE];
            drop(data);
            self.replacer.erase(frame_id)?;
            self.page_table.remove(page_id);
            self.pages[frame_id].clear();
            self.free_frames.push_back(frame_id);
        }
        debug!("deleted page {}", page_id);

        Ok(())
    }

    /// Write every dirty page. Pages latched by a holder are skipped and
    /// reported once the rest are written.
    fn flush_all_pages(&mut self) -> Result<(), BufferPoolManagerError> {
        let mut result = Ok(());
        for frame_id in 0..self.pages.len() {
            match self.write_if_dirty(frame_id) {
                Err(e @ BufferPoolManagerError::PageLatched(_)) => {
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
                other => other?,
            }
        }
        result
    }
}

impl IBufferPoolManager for BufferPoolManager {
    fn fetch_page(&self, page_id: PageId) -> Result<PageHandle, BufferPoolManagerError> {
        if page_id == INVALID_PAGE_ID {
            return Err(BufferPoolManagerError::InvalidPageId);
        }
        self.state.lock().fetch_page(page_id)
    }

    fn new_page(&self) -> Result<PageHandle, BufferPoolManagerError> {
        self.state.lock().new_page()
    }

    fn unpin_page(&self, page_id: PageId, mark_dirty: bool) -> Result<(), BufferPoolManagerError> {
        self.state.lock().unpin_page(page_id, mark_dirty)
    }

    fn flush_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError> {
        if page_id == INVALID_PAGE_ID {
            return Err(BufferPoolManagerError::InvalidPageId);
        }
        self.state.lock().flush_page(page_id)
    }

    fn delete_page(&self, page_id: PageId) -> Result<(), BufferPoolManagerError> {
        if page_id == INVALID_PAGE_ID {
            return Err(BufferPoolManagerError::InvalidPageId);
        }
        self.state.lock().delete_page(page_id)
    }

    fn flush_all_pages(&self) -> Result<(), BufferPoolManagerError> {
        self.state.lock().flush_all_pages()
    }
}
