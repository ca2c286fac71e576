use crate::types::{Project, RawCell, RawRow};
use csv::ReaderBuilder;
use std::error::Error;
use std::fs::{self, File};
use std::io::Read;

/// Load the project directory: a JSON array of project records in the
/// shape the upload API writes (`projectName`, `inspectionDate`,
/// `filePath`, ...).
pub fn load_projects(path: &str) -> Result<Vec<Project>, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let projects: Vec<Project> = serde_json::from_str(&text)?;
    Ok(projects)
}

/// Read checklist rows from a CSV source.
///
/// The reader is configured so the normalizer, not the CSV layer, owns
/// the row semantics:
/// - `has_headers(false)` keeps the header as row 0; the normalizer
///   skips it.
/// - `flexible(true)` tolerates short rows (merged cells export with
///   fewer columns).
/// Empty fields become blank cells.
pub fn rows_from_reader<R: Read>(reader: R) -> Result<Vec<RawRow>, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows: Vec<RawRow> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(RawCell::from).collect());
    }
    Ok(rows)
}

pub fn load_rows(path: &str) -> Result<Vec<RawRow>, Box<dyn Error>> {
    let file = File::open(path)?;
    rows_from_reader(file)
}
