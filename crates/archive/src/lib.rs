#![doc = include_str!("../README.md")]

pub mod error;
pub mod scan;
pub mod search;
pub mod select;

pub use error::ArchiveError;
pub use search::{ArchiveQuery, ArchiveResult, ArchiveSearch};
