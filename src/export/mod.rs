//! Dataset exporters for generated Knowledge Cells.

pub mod csv;
pub mod jsonl;
pub mod report;

pub use csv::write_csv;
pub use jsonl::{load_jsonl, validate_jsonl, write_jsonl, ValidationReport};
pub use report::write_quality_report;
