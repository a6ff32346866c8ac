use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;
use parking_lot::Mutex;

use crate::dbms::types::{PageData, PageId, INVALID_PAGE_ID, PAGE_SIZE};

use super::{DiskManagerError, IDiskManager};

/// Disk manager storing every page in one data file.
///
/// Page `n` lives at byte offset `n * PAGE_SIZE`. Page IDs are handed out in
/// increasing order starting from the number of pages already in the file and
/// are never reused; deallocation only zeroes the block.
pub struct FileDiskManager {
    path: PathBuf,
    // Reads need to seek, and reads only get `&self`
    file: Mutex<File>,
    next_page_id: PageId,
}

impl FileDiskManager {
    /// Open the data file at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DiskManagerError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let file_size = file.metadata()?.len();
        if file_size % PAGE_SIZE as u64 != 0 {
            return Err(DiskManagerError::Corrupted(format!(
                "file size {} is not a multiple of page size {}",
                file_size, PAGE_SIZE
            )));
        }
        let page_count = file_size / PAGE_SIZE as u64;
        let next_page_id =
            PageId::try_from(page_count).map_err(|_| DiskManagerError::PageIdOverflow)?;

        debug!("opened {} holding {} pages", path.display(), page_count);

        Ok(Self {
            path,
            file: Mutex::new(file),
            next_page_id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages ever allocated in the data file
    pub fn page_count(&self) -> PageId {
        self.next_page_id
    }

    fn offset(page_id: PageId) -> u64 {
        page_id as u64 * PAGE_SIZE as u64
    }
}

impl IDiskManager for FileDiskManager {
    fn write_page(&mut self, page_id: PageId, page: &[u8]) -> Result<(), DiskManagerError> {
        if page_id >= self.next_page_id {
            return Err(DiskManagerError::PageNotFound(page_id));
        }
        let mut block = [0u8; PAGE_SIZE];
        let len = page.len().min(PAGE_SIZE);
        block[..len].copy_from_slice(&page[..len]);

        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        file.write_all(&block)?;
        file.flush()?;
        Ok(())
    }

    fn read_page(&self, page_id: PageId) -> Result<PageData, DiskManagerError> {
        if page_id >= self.next_page_id {
            return Err(DiskManagerError::PageNotFound(page_id));
        }
        let mut page_data = [0u8; PAGE_SIZE];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        file.read_exact(&mut page_data)?;
        Ok(page_data)
    }

    fn allocate_page(&mut self) -> Result<PageId, DiskManagerError> {
        let page_id = self.next_page_id;
        if page_id == INVALID_PAGE_ID {
            return Err(DiskManagerError::PageIdOverflow);
        }

        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        file.write_all(&[0u8; PAGE_SIZE])?;
        file.flush()?;

        self.next_page_id += 1;
        Ok(page_id)
    }

    fn deallocate_page(&mut self, page_id: PageId) -> Result<(), DiskManagerError> {
        if page_id >= self.next_page_id {
            return Ok(());
        }
        self.write_page(page_id, &[0u8; PAGE_SIZE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use tempfile::TempDir;

    #[fixture]
    fn data_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    fn test_write_and_read_page(data_dir: TempDir) {
        let mut disk_manager = FileDiskManager::open(data_dir.path().join("data.db")).unwrap();

        let first = disk_manager.allocate_page().unwrap();
        let second = disk_manager.allocate_page().unwrap();
        assert_eq!((first, second), (0, 1));

        disk_manager.write_page(second, &[7; PAGE_SIZE]).unwrap();

        assert_eq!(disk_manager.read_page(first).unwrap(), [0; PAGE_SIZE]);
        assert_eq!(disk_manager.read_page(second).unwrap(), [7; PAGE_SIZE]);
    }

    #[rstest]
    fn test_read_unallocated_page(data_dir: TempDir) {
        let disk_manager = FileDiskManager::open(data_dir.path().join("data.db")).unwrap();
        assert!(matches!(
            disk_manager.read_page(0),
            Err(DiskManagerError::PageNotFound(0))
        ));
    }

    #[rstest]
    fn test_reopen_keeps_pages(data_dir: TempDir) {
        let path = data_dir.path().join("data.db");
        {
            let mut disk_manager = FileDiskManager::open(&path).unwrap();
            for _ in 0..3 {
                disk_manager.allocate_page().unwrap();
            }
            disk_manager.write_page(2, &[5; PAGE_SIZE]).unwrap();
        }

        let mut disk_manager = FileDiskManager::open(&path).unwrap();
        assert_eq!(disk_manager.page_count(), 3);
        assert_eq!(disk_manager.read_page(2).unwrap(), [5; PAGE_SIZE]);
        assert_eq!(disk_manager.allocate_page().unwrap(), 3);
    }

    #[rstest]
    fn test_deallocate_zeroes_block_without_reuse(data_dir: TempDir) {
        let mut disk_manager = FileDiskManager::open(data_dir.path().join("data.db")).unwrap();
        let page_id = disk_manager.allocate_page().unwrap();
        disk_manager.write_page(page_id, &[1; PAGE_SIZE]).unwrap();

        disk_manager.deallocate_page(page_id).unwrap();

        assert_eq!(disk_manager.read_page(page_id).unwrap(), [0; PAGE_SIZE]);
        assert_ne!(disk_manager.allocate_page().unwrap(), page_id);
    }

    #[rstest]
    fn test_corrupted_file_size(data_dir: TempDir) {
        let path = data_dir.path().join("data.db");
        std::fs::write(&path, [0u8; 10]).unwrap();
        assert!(matches!(
            FileDiskManager::open(&path),
            Err(DiskManagerError::Corrupted(_))
        ));
    }
}
