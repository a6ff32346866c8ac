pub mod config;
pub mod page_table;
pub mod pool_manager;
pub mod replacer;
pub mod types;
