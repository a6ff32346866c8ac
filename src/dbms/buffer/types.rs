use crate::dbms::storage::disk::IDiskManager;

use super::page_table::IPageTable;
use super::replacer::IBufferPoolReplacer;

pub type ReplacerGeneric = Box<dyn IBufferPoolReplacer + Send + Sync>;
pub type DiskManagerGeneric = Box<dyn IDiskManager + Send + Sync>;
pub type PageTableGeneric = Box<dyn IPageTable + Send + Sync>;
