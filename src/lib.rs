//! Item lookup and sort-expression listings over a game item catalog.

pub mod commands;
pub mod config;
pub mod error;
pub mod expr;
pub mod format;
pub mod index;
pub mod listing;
pub mod normalize;
pub mod retrieve;
pub mod search;
pub mod store;
pub mod types;

pub use error::{Error, Result};
