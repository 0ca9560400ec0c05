#![doc = include_str!("../README.md")]

pub mod compress;
pub mod engine;
pub mod error;
pub mod policy;
pub mod reopen;
pub mod retention;

pub use engine::{RotationEngine, RotationOutcome, RotationSettings};
pub use error::RotationError;
pub use policy::{DateRange, RotationPolicy, RotationTrigger};
pub use reopen::UpstreamReopen;
pub use retention::{RetentionPass, RetentionPolicy, RetentionReport};
