pub const PAGE_SIZE: usize = 4096;

pub type PageData = [u8; PAGE_SIZE];

pub type PageId = u32;

/// Index of a slot in the buffer pool's frame array
pub type FrameId = usize;

/// Reserved page ID that no disk manager ever allocates
pub const INVALID_PAGE_ID: PageId = PageId::MAX;
