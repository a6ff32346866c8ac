mod buffer_pool_manager;
mod page_handle;
#[cfg(test)]
pub mod testing;

pub use buffer_pool_manager::{BufferPoolManager, BufferPoolManagerError, IBufferPoolManager};
pub use page_handle::PageHandle;
