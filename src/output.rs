use crate::types::{
    BreakdownRow, CategorySummaryRow, OwnerProjectRow, OwnerSummaryRow, RollupResult, ScoreBand,
    SummaryExport,
};
use crate::util::{format_number, percentage_of};
use serde::Serialize;
use std::cmp::Ordering;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

fn format_score(score_sum: f64, max_score_sum: f64) -> String {
    format!(
        "{}/{}",
        format_number(score_sum, 1),
        format_number(max_score_sum, 1)
    )
}

fn format_percentage(percentage: f64) -> String {
    format!("{:.1}", percentage)
}

/// Per-category summary rows, highest percentage first.
pub fn category_rows(rollup: &RollupResult) -> Vec<CategorySummaryRow> {
    let mut rows: Vec<(f64, CategorySummaryRow)> = rollup
        .by_major_category
        .iter()
        .map(|(label, category)| {
            let pct = percentage_of(category.node.score_sum, category.node.max_score_sum);
            let row = CategorySummaryRow {
                category: label.clone(),
                score: format_score(category.node.score_sum, category.node.max_score_sum),
                percentage: format_percentage(pct),
                band: ScoreBand::from_percentage(pct).to_string(),
                items: category.node.item_count,
                owners: category.owners_seen.len(),
            };
            (pct, row)
        })
        .collect();
    rows.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.category.cmp(&b.1.category))
    });
    rows.into_iter().map(|(_, row)| row).collect()
}

/// Per-owner summary rows, highest percentage first.
pub fn owner_rows(rollup: &RollupResult) -> Vec<OwnerSummaryRow> {
    let mut rows: Vec<(f64, OwnerSummaryRow)> = rollup
        .by_owner
        .iter()
        .map(|(label, owner)| {
            let pct = percentage_of(owner.node.score_sum, owner.node.max_score_sum);
            let row = OwnerSummaryRow {
                owner: label.clone(),
                score: format_score(owner.node.score_sum, owner.node.max_score_sum),
                percentage: format_percentage(pct),
                band: ScoreBand::from_percentage(pct).to_string(),
                items: owner.node.item_count,
                projects: owner.projects_seen.len(),
            };
            (pct, row)
        })
        .collect();
    rows.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.owner.cmp(&b.1.owner))
    });
    rows.into_iter().map(|(_, row)| row).collect()
}

/// Drill-down rows for one major category: the category total, then each
/// sub-category and its sub-sub-categories, labels sorted.
pub fn breakdown_rows(rollup: &RollupResult, category: &str) -> Vec<BreakdownRow> {
    let Some(rollup_category) = rollup.by_major_category.get(category) else {
        return Vec::new();
    };
    let node = &rollup_category.node;
    let mut rows = vec![BreakdownRow {
        category: category.to_string(),
        sub_category: String::new(),
        sub_sub_category: String::new(),
        score: format_score(node.score_sum, node.max_score_sum),
        percentage: format_percentage(percentage_of(node.score_sum, node.max_score_sum)),
    }];

    let mut subs: Vec<_> = node.children.iter().collect();
    subs.sort_by(|a, b| a.0.cmp(b.0));
    for (sub_label, sub) in subs {
        rows.push(BreakdownRow {
            category: category.to_string(),
            sub_category: sub_label.clone(),
            sub_sub_category: String::new(),
            score: format_score(sub.score_sum, sub.max_score_sum),
            percentage: format_percentage(percentage_of(sub.score_sum, sub.max_score_sum)),
        });
        let mut leaves: Vec<_> = sub.children.iter().collect();
        leaves.sort_by(|a, b| a.0.cmp(b.0));
        for (leaf_label, leaf) in leaves {
            rows.push(BreakdownRow {
                category: category.to_string(),
                sub_category: sub_label.clone(),
                sub_sub_category: leaf_label.clone(),
                score: format_score(leaf.score_sum, leaf.max_score_sum),
                percentage: format_percentage(percentage_of(leaf.score_sum, leaf.max_score_sum)),
            });
        }
    }
    rows
}

/// Per-project drill-down for one owner, from the multi-project branch:
/// one row per project and major category.
pub fn owner_project_rows(rollup: &RollupResult, owner: &str) -> Vec<OwnerProjectRow> {
    let Some(rollup_owner) = rollup.by_owner.get(owner) else {
        return Vec::new();
    };
    let mut projects: Vec<_> = rollup_owner.projects.iter().collect();
    projects.sort_by(|a, b| a.0.cmp(b.0));
    let mut rows = Vec::new();
    for (project_label, project) in projects {
        let mut majors: Vec<_> = project.children.iter().collect();
        majors.sort_by(|a, b| a.0.cmp(b.0));
        for (major_label, major) in majors {
            rows.push(OwnerProjectRow {
                project: project_label.clone(),
                category: major_label.clone(),
                score: format_score(major.score_sum, major.max_score_sum),
                percentage: format_percentage(percentage_of(major.score_sum, major.max_score_sum)),
            });
        }
    }
    rows
}

pub fn summary_export(rollup: &RollupResult) -> SummaryExport {
    SummaryExport {
        overall: rollup.overall,
        categories: category_rows(rollup),
        owners: owner_rows(rollup),
    }
}

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::aggregate_multi_project;
    use crate::types::ScoreItem;

    fn item(project: &str, major: &str, sub: &str, owner: &str, score: f64) -> ScoreItem {
        ScoreItem {
            project: project.to_string(),
            major_category: major.to_string(),
            sub_category: sub.to_string(),
            sub_sub_category: String::new(),
            task: String::new(),
            owner: owner.to_string(),
            score,
            max_score: 10.0,
            score_range_label: "0/10".to_string(),
        }
    }

    fn sample_rollup() -> crate::types::RollupResult {
        aggregate_multi_project(&[
            item("P1", "안전", "교육", "Kim", 9.0),
            item("P1", "안전", "설비", "Lee", 6.0),
            item("P2", "품질", "검사", "Kim", 8.0),
        ])
    }

    #[test]
    fn category_rows_sorted_by_percentage_desc() {
        let rows = category_rows(&sample_rollup());
        assert_eq!(rows[0].category, "품질");
        assert_eq!(rows[0].percentage, "80.0");
        assert_eq!(rows[0].band, "Good");
        assert_eq!(rows[1].category, "안전");
        assert_eq!(rows[1].score, "15.0/20.0");
        assert_eq!(rows[1].owners, 2);
    }

    #[test]
    fn owner_rows_include_project_counts() {
        let rows = owner_rows(&sample_rollup());
        let kim = rows.iter().find(|r| r.owner == "Kim").unwrap();
        assert_eq!(kim.projects, 2);
        assert_eq!(kim.items, 2);
        assert_eq!(kim.percentage, "85.0");
    }

    #[test]
    fn breakdown_starts_with_category_total() {
        let rows = breakdown_rows(&sample_rollup(), "안전");
        assert_eq!(rows[0].sub_category, "");
        assert_eq!(rows[0].score, "15.0/20.0");
        let labels: Vec<&str> = rows[1..].iter().map(|r| r.sub_category.as_str()).collect();
        assert_eq!(labels, ["교육", "설비"]);
        assert!(breakdown_rows(&sample_rollup(), "없음").is_empty());
    }

    #[test]
    fn owner_project_rows_walk_the_project_branch() {
        let rows = owner_project_rows(&sample_rollup(), "Kim");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].project, "P1");
        assert_eq!(rows[0].category, "안전");
        assert_eq!(rows[1].project, "P2");
        assert_eq!(rows[1].percentage, "80.0");
    }

    #[test]
    fn export_carries_overall_and_tables() {
        let export = summary_export(&sample_rollup());
        assert_eq!(export.overall.total, 23.0);
        assert_eq!(export.categories.len(), 2);
        assert_eq!(export.owners.len(), 2);
    }
}
