use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    pub id: u32,
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "generalManager", default)]
    pub general_manager: String,
    #[serde(default)]
    pub inspector: String,
    #[serde(rename = "inspectionDate", default)]
    pub inspection_date: Option<String>,
    #[serde(rename = "uploadDate", default)]
    pub upload_date: String,
    #[serde(rename = "lastModified", default)]
    pub last_modified: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

/// One spreadsheet cell. `None` and whitespace-only values both count as
/// blank; labels are always consumed trimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCell {
    pub value: Option<String>,
}

impl RawCell {
    pub fn text(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_none()
    }
}

impl From<&str> for RawCell {
    fn from(field: &str) -> Self {
        if field.is_empty() {
            RawCell { value: None }
        } else {
            RawCell {
                value: Some(field.to_string()),
            }
        }
    }
}

/// Positional checklist row: 0 major category, 1 sub-category,
/// 2 sub-sub-category, 3 task, 4 owner, 5 score, 6 range "min/max".
pub type RawRow = Vec<RawCell>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreItem {
    pub project: String,
    #[serde(rename = "majorCategory")]
    pub major_category: String,
    #[serde(rename = "subCategory")]
    pub sub_category: String,
    #[serde(rename = "subSubCategory")]
    pub sub_sub_category: String,
    pub task: String,
    pub owner: String,
    pub score: f64,
    #[serde(rename = "maxScore")]
    pub max_score: f64,
    #[serde(rename = "scoreRange")]
    pub score_range_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn label(&self) -> String {
        format!("{}/{}", self.min, self.max)
    }
}

impl Default for ScoreRange {
    // A garbled range must not zero the denominator, so max defaults to 1.
    fn default() -> Self {
        ScoreRange { min: 0.0, max: 1.0 }
    }
}

/// One rollup subtree. The same shape is reused at every depth:
/// major -> sub -> sub-sub under a category, the mirrored nesting under
/// each owner, and under owner/project in multi-project mode.
#[derive(Debug, Clone, Default)]
pub struct AggregateNode {
    pub score_sum: f64,
    pub max_score_sum: f64,
    pub item_count: usize,
    pub children: HashMap<String, AggregateNode>,
}

impl AggregateNode {
    pub fn add(&mut self, item: &ScoreItem) {
        self.score_sum += item.score;
        self.max_score_sum += item.max_score;
        self.item_count += 1;
    }

    pub fn child(&mut self, label: &str) -> &mut AggregateNode {
        self.children.entry(label.to_string()).or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryRollup {
    pub node: AggregateNode,
    pub owners_seen: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OwnerRollup {
    pub node: AggregateNode,
    // Populated in multi-project mode only.
    pub projects_seen: HashSet<String>,
    pub projects: HashMap<String, AggregateNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OverallScore {
    pub total: f64,
    pub max: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RollupResult {
    pub by_major_category: HashMap<String, CategoryRollup>,
    pub by_owner: HashMap<String, OwnerRollup>,
    pub overall: OverallScore,
}

/// 4-tier status band derived from a percentage; thresholds match the
/// dashboard color coding (green/blue/yellow/red).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            ScoreBand::Excellent
        } else if percentage >= 80.0 {
            ScoreBand::Good
        } else if percentage >= 70.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategorySummaryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
    #[serde(rename = "Band")]
    #[tabled(rename = "Band")]
    pub band: String,
    #[serde(rename = "Items")]
    #[tabled(rename = "Items")]
    pub items: usize,
    #[serde(rename = "Owners")]
    #[tabled(rename = "Owners")]
    pub owners: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OwnerSummaryRow {
    #[serde(rename = "Owner")]
    #[tabled(rename = "Owner")]
    pub owner: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
    #[serde(rename = "Band")]
    #[tabled(rename = "Band")]
    pub band: String,
    #[serde(rename = "Items")]
    #[tabled(rename = "Items")]
    pub items: usize,
    #[serde(rename = "Projects")]
    #[tabled(rename = "Projects")]
    pub projects: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "SubCategory")]
    #[tabled(rename = "SubCategory")]
    pub sub_category: String,
    #[serde(rename = "SubSubCategory")]
    #[tabled(rename = "SubSubCategory")]
    pub sub_sub_category: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct OwnerProjectRow {
    #[serde(rename = "Project")]
    #[tabled(rename = "Project")]
    pub project: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryExport {
    pub overall: OverallScore,
    pub categories: Vec<CategorySummaryRow>,
    pub owners: Vec<OwnerSummaryRow>,
}
