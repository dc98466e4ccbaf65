//! Candidate source implementations.

pub mod memory;

pub use memory::MemorySource;
