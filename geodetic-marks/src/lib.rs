//! Geodetic mark lookup.
//!
//! Fetches mark records from the geodetic database (web service or a direct
//! database connection), caching them in memory and optionally on disk, and
//! parses the standard filenames used for mark photographs and diagrams.

pub mod domain;
pub mod fetcher;
pub mod file_cache;
pub mod gdb;
pub mod images;

pub use domain::{MarkCode, MarkRecord};
pub use fetcher::{CacheMode, MarkFetcher};
pub use file_cache::{FileCache, FileCacheConfig};
pub use gdb::GdbError;
pub use images::{ImageError, MarkImage};
