//! Export of crawl results

mod dump;

pub use dump::{dump_path, dump_urls};
