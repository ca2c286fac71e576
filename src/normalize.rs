use crate::types::{RawRow, ScoreItem};
use crate::util::{parse_number, parse_score_range};

#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    pub total_rows: usize,
    pub item_rows: usize,
    pub blank_rows: usize,
}

fn cell_text(row: &RawRow, idx: usize) -> Option<&str> {
    row.get(idx).and_then(|c| c.text())
}

/// Turn one project's raw checklist rows into validated score items.
///
/// - Row 0 is the header and is always skipped.
/// - Rows whose every cell is blank are skipped.
/// - A blank major-category cell inherits the last non-blank value seen
///   in this row set (spreadsheets merge repeated category cells, which
///   exports as blanks). The other labels default to `""` with no
///   carry-forward.
/// - Score and range parsing never fail; see `util`.
///
/// Pure: input rows are not mutated, items are derived fresh per call.
pub fn normalize(rows: &[RawRow], project_name: &str) -> (Vec<ScoreItem>, NormalizeReport) {
    let mut items: Vec<ScoreItem> = Vec::new();
    let mut blank_rows = 0usize;
    let mut carried_major = String::new();

    for row in rows.iter().skip(1) {
        if row.is_empty() || row.iter().all(|c| c.is_blank()) {
            blank_rows += 1;
            continue;
        }

        if let Some(major) = cell_text(row, 0) {
            carried_major = major.to_string();
        }

        let score = parse_number(cell_text(row, 5), 0.0);
        let range = parse_score_range(cell_text(row, 6));

        items.push(ScoreItem {
            project: project_name.to_string(),
            major_category: carried_major.clone(),
            sub_category: cell_text(row, 1).unwrap_or("").to_string(),
            sub_sub_category: cell_text(row, 2).unwrap_or("").to_string(),
            task: cell_text(row, 3).unwrap_or("").to_string(),
            owner: cell_text(row, 4).unwrap_or("").to_string(),
            score,
            max_score: range.max,
            score_range_label: range.label(),
        });
    }

    let report = NormalizeReport {
        total_rows: rows.len().saturating_sub(1),
        item_rows: items.len(),
        blank_rows,
    };
    (items, report)
}
