//! Command handlers -- one module per subcommand

pub mod config;
pub mod files;
pub mod live;
pub mod rotate;
pub mod search;
pub mod status;
