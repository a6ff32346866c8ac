//! Buffer pool manager for a disk-based storage engine.
//!
//! Fixed-size pages are cached in a bounded pool of frames. Callers pin pages
//! with [`fetch_page`](dbms::buffer::pool_manager::IBufferPoolManager::fetch_page)
//! or [`new_page`](dbms::buffer::pool_manager::IBufferPoolManager::new_page) and
//! release them with `unpin_page`; unpinned pages are evicted by a pluggable
//! replacement policy when the pool runs out of free frames.

pub mod dbms;
