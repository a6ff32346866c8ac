use crate::dbms::buffer::replacer::LruReplacer;
use crate::dbms::storage::disk::testing::{DiskStats, InMemoryDiskManager};

use super::BufferPoolManager;

pub fn create_testing_pool_manager(pool_size: usize) -> BufferPoolManager {
    create_testing_pool_manager_with_stats(pool_size).0
}

/// Like [`create_testing_pool_manager`], also returning the disk call counters
pub fn create_testing_pool_manager_with_stats(pool_size: usize) -> (BufferPoolManager, DiskStats) {
    let disk_manager = InMemoryDiskManager::new();
    let stats = disk_manager.stats();
    let replacer = LruReplacer::new(pool_size);
    let buffer_pool_manager =
        BufferPoolManager::new(pool_size, Box::new(replacer), Box::new(disk_manager));
    (buffer_pool_manager, stats)
}
