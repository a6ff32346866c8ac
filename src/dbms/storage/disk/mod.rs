mod disk_manager;
mod file_disk_manager;
#[cfg(test)]
pub mod testing;

pub use disk_manager::{DiskManagerError, IDiskManager};
#[cfg(test)]
pub use disk_manager::MockIDiskManager;
pub use file_disk_manager::FileDiskManager;
