//! JSONL export and validation.
//!
//! One Knowledge Cell per line. This is the canonical interchange
//! format; the CSV and report exporters are derived views.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::types::cell::KnowledgeCell;

/// Write cells to a JSONL file, one per line.
pub fn write_jsonl(cells: &[KnowledgeCell], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for cell in cells {
        writeln!(writer, "{}", cell.to_jsonl_line()?)?;
    }
    writer.flush()?;

    info!(cells = cells.len(), path = %path.display(), "wrote JSONL export");
    Ok(())
}

/// Load cells back from a JSONL file. Blank lines are skipped;
/// malformed lines are an error.
pub fn load_jsonl(path: &Path) -> Result<Vec<KnowledgeCell>> {
    let reader = BufReader::new(File::open(path)?);
    let mut cells = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        cells.push(KnowledgeCell::from_jsonl_line(&line)?);
    }
    Ok(cells)
}

/// Outcome of a tolerant validation pass over a JSONL export.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Lines that parsed as valid cells
    pub valid: usize,

    /// Lines that failed to parse, with the 1-based line number and
    /// the parse error text
    pub errors: Vec<(usize, String)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a JSONL export line by line without aborting on the first
/// malformed line.
pub fn validate_jsonl(path: &Path) -> Result<ValidationReport> {
    let reader = BufReader::new(File::open(path)?);
    let mut report = ValidationReport::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match KnowledgeCell::from_jsonl_line(&line) {
            Ok(_) => report.valid += 1,
            Err(error) => {
                warn!(line = index + 1, %error, "invalid JSONL line");
                report.errors.push((index + 1, error.to_string()));
            }
        }
    }

    Ok(report)
}
