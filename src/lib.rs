pub mod cli;
pub mod config;
pub mod global;
pub mod live;
pub mod meeting;
pub mod reconcile;
pub mod segment;
pub mod snapshot;
pub mod transcript;
