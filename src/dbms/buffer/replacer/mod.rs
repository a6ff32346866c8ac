mod buffer_pool_replacer;
mod clock_replacer;
mod lru_replacer;

pub use buffer_pool_replacer::{BufferPoolReplacerError, IBufferPoolReplacer};
pub use clock_replacer::ClockReplacer;
pub use lru_replacer::LruReplacer;
