//! Domain data types.

pub mod candidate;
pub mod cell;
pub mod config;
pub mod term;
