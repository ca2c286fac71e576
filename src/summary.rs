use crate::loader;
use crate::normalize::normalize;
use crate::period::{filter_by_period, DateRange, PeriodSelector};
use crate::types::{
    CategoryRollup, OverallScore, OwnerRollup, Project, RawRow, RollupResult, ScoreItem,
};
use crate::util::percentage_of;
use chrono::NaiveDateTime;
use std::collections::HashMap;

// Single left-to-right fold over the items. Sums are commutative, so the
// result is independent of item order; every item lands in the tree
// exactly once, with empty owner/category labels kept as "" keys rather
// than dropped.
fn fold(items: &[ScoreItem], track_projects: bool) -> RollupResult {
    let mut by_major_category: HashMap<String, CategoryRollup> = HashMap::new();
    let mut by_owner: HashMap<String, OwnerRollup> = HashMap::new();
    let mut total = 0.0f64;
    let mut max = 0.0f64;

    for item in items {
        total += item.score;
        max += item.max_score;

        // Category branch: major -> sub -> sub-sub, plus distinct owners
        // at the major node.
        let category = by_major_category
            .entry(item.major_category.clone())
            .or_default();
        category.node.add(item);
        category.owners_seen.insert(item.owner.clone());
        let sub = category.node.child(&item.sub_category);
        sub.add(item);
        if !item.sub_sub_category.is_empty() {
            sub.child(&item.sub_sub_category).add(item);
        }

        // Owner branch mirrors the category nesting.
        let owner = by_owner.entry(item.owner.clone()).or_default();
        owner.node.add(item);
        let owner_major = owner.node.child(&item.major_category);
        owner_major.add(item);
        let owner_sub = owner_major.child(&item.sub_category);
        owner_sub.add(item);
        if !item.sub_sub_category.is_empty() {
            owner_sub.child(&item.sub_sub_category).add(item);
        }

        // Multi-project mode also scopes the owner branch per project so
        // a per-owner-per-project drill-down is possible.
        if track_projects {
            owner.projects_seen.insert(item.project.clone());
            let project = owner.projects.entry(item.project.clone()).or_default();
            project.add(item);
            let project_major = project.child(&item.major_category);
            project_major.add(item);
            let project_sub = project_major.child(&item.sub_category);
            project_sub.add(item);
            if !item.sub_sub_category.is_empty() {
                project_sub.child(&item.sub_sub_category).add(item);
            }
        }
    }

    RollupResult {
        by_major_category,
        by_owner,
        overall: OverallScore {
            total,
            max,
            percentage: percentage_of(total, max),
        },
    }
}

pub fn aggregate(items: &[ScoreItem]) -> RollupResult {
    fold(items, false)
}

pub fn aggregate_multi_project(items: &[ScoreItem]) -> RollupResult {
    fold(items, true)
}

/// Summarize one project's raw checklist rows.
pub fn compute_project_summary(rows: &[RawRow], project_name: &str) -> RollupResult {
    let (items, _) = normalize(rows, project_name);
    aggregate(&items)
}

/// Summarize every project in the period: filter by inspection date,
/// load each project's rows, normalize, and fold them all into one
/// rollup. A load failure for one project is logged and contributes zero
/// items; it never aborts the rest.
pub fn compute_multi_project_summary(
    projects: &[Project],
    selector: PeriodSelector,
    custom: Option<&DateRange>,
    now: NaiveDateTime,
) -> RollupResult {
    let selected = filter_by_period(projects, selector, custom, now);
    let mut items: Vec<ScoreItem> = Vec::new();
    for project in &selected {
        match loader::load_rows(&project.file_path) {
            Ok(rows) => {
                let (mut project_items, _) = normalize(&rows, &project.project_name);
                items.append(&mut project_items);
            }
            Err(e) => {
                log::warn!(
                    "failed to load rows for {} ({}): {}",
                    project.project_name,
                    project.file_path,
                    e
                );
            }
        }
    }
    aggregate_multi_project(&items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawCell;
    use chrono::NaiveDate;

    fn item(
        project: &str,
        major: &str,
        sub: &str,
        sub_sub: &str,
        owner: &str,
        score: f64,
        max_score: f64,
    ) -> ScoreItem {
        ScoreItem {
            project: project.to_string(),
            major_category: major.to_string(),
            sub_category: sub.to_string(),
            sub_sub_category: sub_sub.to_string(),
            task: String::new(),
            owner: owner.to_string(),
            score,
            max_score,
            score_range_label: format!("0/{}", max_score),
        }
    }

    fn sample_items() -> Vec<ScoreItem> {
        vec![
            item("P1", "안전", "교육", "정기", "Kim", 8.0, 10.0),
            item("P1", "안전", "교육", "", "Lee", 6.0, 10.0),
            item("P1", "안전", "설비", "소화기", "Kim", 9.0, 10.0),
            item("P1", "품질", "검사", "", "Lee", 7.0, 10.0),
            item("P2", "품질", "검사", "", "Kim", 5.0, 10.0),
        ]
    }

    #[test]
    fn end_to_end_scenario() {
        let rows: Vec<RawRow> = vec![
            vec!["h"; 7].into_iter().map(RawCell::from).collect(),
            ["안전", "", "", "", "", "8", "0/10"]
                .iter()
                .map(|c| RawCell::from(*c))
                .collect(),
            ["", "", "", "", "Kim", "9", "0/10"]
                .iter()
                .map(|c| RawCell::from(*c))
                .collect(),
        ];
        let rollup = compute_project_summary(&rows, "P");
        let category = &rollup.by_major_category["안전"];
        assert_eq!(category.node.score_sum, 17.0);
        assert_eq!(category.node.max_score_sum, 20.0);
        assert_eq!(category.node.item_count, 2);
        assert_eq!(rollup.overall.total, 17.0);
        assert_eq!(rollup.overall.max, 20.0);
        assert_eq!(rollup.overall.percentage, 85.0);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let mut reversed = sample_items();
        reversed.reverse();
        let a = aggregate(&sample_items());
        let b = aggregate(&reversed);

        assert_eq!(a.overall, b.overall);
        for (label, category) in &a.by_major_category {
            let other = &b.by_major_category[label];
            assert_eq!(category.node.score_sum, other.node.score_sum);
            assert_eq!(category.node.max_score_sum, other.node.max_score_sum);
            assert_eq!(category.node.item_count, other.node.item_count);
            assert_eq!(category.owners_seen, other.owners_seen);
        }
        for (label, owner) in &a.by_owner {
            let other = &b.by_owner[label];
            assert_eq!(owner.node.score_sum, other.node.score_sum);
            assert_eq!(owner.node.item_count, other.node.item_count);
        }
    }

    #[test]
    fn conservation_of_totals() {
        let items = sample_items();
        let rollup = aggregate(&items);
        let score: f64 = items.iter().map(|i| i.score).sum();
        let max: f64 = items.iter().map(|i| i.max_score).sum();
        assert_eq!(rollup.overall.total, score);
        assert_eq!(rollup.overall.max, max);

        let tree_items: usize = rollup
            .by_major_category
            .values()
            .map(|c| c.node.item_count)
            .sum();
        assert_eq!(tree_items, items.len());
        let owner_items: usize = rollup.by_owner.values().map(|o| o.node.item_count).sum();
        assert_eq!(owner_items, items.len());
    }

    #[test]
    fn nested_levels_accumulate() {
        let rollup = aggregate(&sample_items());
        let safety = &rollup.by_major_category["안전"];
        let training = &safety.node.children["교육"];
        assert_eq!(training.score_sum, 14.0);
        assert_eq!(training.item_count, 2);
        // Sub-sub node exists only where the label is non-empty.
        assert_eq!(training.children["정기"].item_count, 1);
        assert!(!safety.node.children["설비"].children.is_empty());
        assert_eq!(safety.owners_seen.len(), 2);
    }

    #[test]
    fn owner_branch_mirrors_categories() {
        let rollup = aggregate(&sample_items());
        let kim = &rollup.by_owner["Kim"];
        assert_eq!(kim.node.score_sum, 22.0);
        assert_eq!(kim.node.item_count, 3);
        let kim_safety = &kim.node.children["안전"];
        assert_eq!(kim_safety.score_sum, 17.0);
        assert_eq!(kim_safety.children["교육"].children["정기"].score_sum, 8.0);
        // Single-project mode leaves the project branch empty.
        assert!(kim.projects.is_empty());
        assert!(kim.projects_seen.is_empty());
    }

    #[test]
    fn multi_project_mode_tracks_projects_per_owner() {
        let rollup = aggregate_multi_project(&sample_items());
        let kim = &rollup.by_owner["Kim"];
        assert_eq!(kim.projects_seen.len(), 2);
        let p2 = &kim.projects["P2"];
        assert_eq!(p2.score_sum, 5.0);
        assert_eq!(p2.children["품질"].children["검사"].score_sum, 5.0);
        let lee = &rollup.by_owner["Lee"];
        assert_eq!(lee.projects_seen.len(), 1);
    }

    #[test]
    fn empty_labels_aggregate_under_empty_key() {
        let items = vec![
            item("P", "", "", "", "", 1.0, 2.0),
            item("P", "안전", "", "", "", 1.0, 2.0),
        ];
        let rollup = aggregate(&items);
        assert_eq!(rollup.by_major_category[""].node.item_count, 1);
        assert_eq!(rollup.by_owner[""].node.item_count, 2);
        assert_eq!(rollup.overall.total, 2.0);
        assert_eq!(rollup.overall.max, 4.0);
    }

    #[test]
    fn empty_dataset_yields_zero_percentage() {
        let rollup = aggregate(&[]);
        assert!(rollup.by_major_category.is_empty());
        assert!(rollup.by_owner.is_empty());
        assert_eq!(rollup.overall.percentage, 0.0);
    }

    #[test]
    fn multi_project_summary_skips_failing_project() {
        let dir = std::env::temp_dir().join("inspection_report_summary_test");
        std::fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.csv");
        std::fs::write(
            &good,
            "대분류,중분류,소분류,임무,담당자,점수,점수범위\n안전,교육,,확인,Kim,8,0/10\n,설비,,점검,Lee,9,0/10\n",
        )
        .unwrap();

        let project = |id: u32, date: &str, path: &str| Project {
            id,
            project_name: format!("project-{}", id),
            location: String::new(),
            general_manager: String::new(),
            inspector: String::new(),
            inspection_date: Some(date.to_string()),
            upload_date: String::new(),
            last_modified: String::new(),
            file_path: path.to_string(),
        };
        let projects = vec![
            project(1, "2024-12-01", good.to_str().unwrap()),
            // Missing file: logged, contributes zero items.
            project(2, "2024-12-15", dir.join("missing.csv").to_str().unwrap()),
            // Out of the 6-month window entirely.
            project(3, "2023-01-01", good.to_str().unwrap()),
        ];

        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let rollup =
            compute_multi_project_summary(&projects, PeriodSelector::SixMonths, None, now);
        assert_eq!(rollup.overall.total, 17.0);
        assert_eq!(rollup.overall.max, 20.0);
        // Carry-forward applied within the one loaded project.
        assert_eq!(rollup.by_major_category["안전"].node.item_count, 2);
        assert_eq!(rollup.by_owner["Kim"].projects_seen.len(), 1);
    }
}
