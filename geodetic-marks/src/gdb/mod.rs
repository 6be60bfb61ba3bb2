//! Geodetic database access.
//!
//! Mark payloads can come from the public web service (the default), from a
//! direct PostgreSQL connection, or from an in-memory mock. All three
//! implement [`MarkSource`] and return the raw JSON document for a mark.

mod client;
mod database;
mod error;
mod mock;
mod source;

pub use client::{DEFAULT_URL_TEMPLATE, HttpSource, HttpSourceConfig};
pub use database::{DatabaseConfig, DatabaseSource};
pub use error::{GdbError, SourceError};
pub use mock::MockSource;
pub use source::MarkSource;
