#[cfg(test)]
use mockall::automock;

use thiserror::Error;

use crate::dbms::types::{PageData, PageId};

#[derive(Debug, Error)]
pub enum DiskManagerError {
    #[error("page {0} does not exist on disk")]
    PageNotFound(PageId),
    #[error("no page IDs left to allocate")]
    PageIdOverflow,
    #[error("disk I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("data file is corrupted: {0}")]
    Corrupted(String),
}

/// Block-level storage underneath the buffer pool. Every call is blocking.
#[cfg_attr(test, automock)]
pub trait IDiskManager {
    /// Write a whole page to its block on disk
    fn write_page(&mut self, page_id: PageId, page: &[u8]) -> Result<(), DiskManagerError>;
    /// Read a whole page from its block on disk
    fn read_page(&self, page_id: PageId) -> Result<PageData, DiskManagerError>;
    /// Hand out a fresh page ID. Never returns an ID that is still live, nor
    /// `INVALID_PAGE_ID`.
    fn allocate_page(&mut self) -> Result<PageId, DiskManagerError>;
    /// Logically free the storage backing a page
    fn deallocate_page(&mut self, page_id: PageId) -> Result<(), DiskManagerError>;
}
