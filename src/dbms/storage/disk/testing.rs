use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::dbms::types::{PageData, PageId, INVALID_PAGE_ID, PAGE_SIZE};

use super::{DiskManagerError, IDiskManager};

/// Per-operation call counters of an [`InMemoryDiskManager`]. Cloning shares
/// the counters, so a test can keep a copy after handing the disk manager to
/// a buffer pool.
#[derive(Clone, Default)]
pub struct DiskStats {
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    allocations: Arc<AtomicUsize>,
    deallocations: Arc<AtomicUsize>,
}

impl DiskStats {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::SeqCst)
    }
}

/// A purely in-memory implementation of the DiskManager trait for testing purposes.
/// Also exposes the underlying data structures for inspection in tests.
#[derive(Default)]
pub struct InMemoryDiskManager {
    /// page_id -> page_data
    pub pages: HashMap<PageId, Vec<u8>>,
    next_page_id: PageId,
    stats: DiskStats,
}

impl InMemoryDiskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a handle on the call counters
    pub fn stats(&self) -> DiskStats {
        self.stats.clone()
    }
}

impl IDiskManager for InMemoryDiskManager {
    fn write_page(&mut self, page_id: PageId, page: &[u8]) -> Result<(), DiskManagerError> {
        self.stats.writes.fetch_add(1, Ordering::SeqCst);
        self.pages.insert(page_id, page.to_vec());
        Ok(())
    }

    fn read_page(&self, page_id: PageId) -> Result<PageData, DiskManagerError> {
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        let page = match self.pages.get(&page_id) {
            Some(page) => page,
            None => return Err(DiskManagerError::PageNotFound(page_id)),
        };
        let mut page_data = [0u8; PAGE_SIZE];
        page_data.copy_from_slice(page);
        Ok(page_data)
    }

    fn allocate_page(&mut self) -> Result<PageId, DiskManagerError> {
        let page_id = self.next_page_id;
        if page_id == INVALID_PAGE_ID {
            return Err(DiskManagerError::PageIdOverflow);
        }
        self.next_page_id += 1;
        self.stats.allocations.fetch_add(1, Ordering::SeqCst);
        self.pages.insert(page_id, vec![0u8; PAGE_SIZE]);
        Ok(page_id)
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<(), DiskManagerError> {
        self.stats.deallocations.fetch_add(1, Ordering::SeqCst);
        self.pages.remove(&page_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_allocate_never_reuses_ids() {
        let mut disk_manager = InMemoryDiskManager::new();
        let first = disk_manager.allocate_page().unwrap();
        disk_manager.deallocate_page(first).unwrap();
        let second = disk_manager.allocate_page().unwrap();
        assert_ne!(first, second);
        assert!(matches!(
            disk_manager.read_page(first),
            Err(DiskManagerError::PageNotFound(id)) if id == first
        ));
    }

    #[rstest]
    fn test_stats_are_shared() {
        let mut disk_manager = InMemoryDiskManager::new();
        let stats = disk_manager.stats();

        let page_id = disk_manager.allocate_page().unwrap();
        disk_manager.write_page(page_id, &[1; PAGE_SIZE]).unwrap();
        assert_eq!(disk_manager.read_page(page_id).unwrap(), [1; PAGE_SIZE]);
        disk_manager.deallocate_page(page_id).unwrap();

        assert_eq!(stats.allocations(), 1);
        assert_eq!(stats.writes(), 1);
        assert_eq!(stats.reads(), 1);
        assert_eq!(stats.deallocations(), 1);
    }
}
