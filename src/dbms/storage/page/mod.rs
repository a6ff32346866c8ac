mod page_type;

pub use page_type::{Page, PageError};
