// Entry point and high-level CLI flow.
//
// The binary is the console face of the inspection dashboard:
// - Option [1] loads the project directory, printing diagnostics.
// - Option [2] summarizes one project's checklist with an optional
//   category drill-down.
// - Option [3] builds the period-filtered rollup across all projects,
//   exports summary files, and offers an owner drill-down.
mod loader;
mod normalize;
mod output;
mod period;
mod summary;
mod types;
mod util;

use chrono::Local;
use once_cell::sync::Lazy;
use period::{DateRange, PeriodSelector};
use std::io::{self, Write};
use std::sync::Mutex;
use types::Project;
use util::format_int;

const PROJECTS_FILE: &str = "projects.json";

// Simple in-memory app state so we only read the project directory once
// but can generate summaries multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { projects: None }));

struct AppState {
    projects: Option<Vec<Project>>,
}

/// Read a single line of input after printing a prompt.
///
/// The same helper is reused for the menus and for free-text inputs
/// like ids, category names and dates.
fn read_input(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after a summary.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_input("Back to menu (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the project directory.
fn handle_load() {
    match loader::load_projects(PROJECTS_FILE) {
        Ok(projects) => {
            let dated = projects
                .iter()
                .filter(|p| util::parse_date_safe(p.inspection_date.as_deref()).is_some())
                .count();
            println!(
                "Loaded {} projects ({} with an inspection date).\n",
                format_int(projects.len() as i64),
                format_int(dated as i64)
            );
            let mut state = APP_STATE.lock().unwrap();
            state.projects = Some(projects);
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", PROJECTS_FILE, e);
        }
    }
}

fn loaded_projects() -> Option<Vec<Project>> {
    let state = APP_STATE.lock().unwrap();
    state.projects.clone()
}

fn print_rollup(rollup: &types::RollupResult) {
    println!(
        "Overall score: {}/{} ({:.1}%)\n",
        util::format_number(rollup.overall.total, 1),
        util::format_number(rollup.overall.max, 1),
        rollup.overall.percentage
    );
    println!("By work category:");
    output::preview_table_rows(&output::category_rows(rollup), usize::MAX);
    println!("By owner:");
    output::preview_table_rows(&output::owner_rows(rollup), usize::MAX);
}

/// Handle option [2]: summarize a single project's checklist.
fn handle_project_summary() {
    let Some(projects) = loaded_projects() else {
        println!("Error: No projects loaded. Please load the project list first (option 1).\n");
        return;
    };

    for p in &projects {
        println!(
            "[{}] {} @ {} (GM: {}, inspector: {}, inspected: {})",
            p.id,
            p.project_name,
            p.location,
            p.general_manager,
            p.inspector,
            p.inspection_date.as_deref().unwrap_or("-")
        );
    }
    let raw_id = read_input("Project id: ");
    let Ok(id) = raw_id.parse::<u32>() else {
        println!("Invalid id: {}\n", raw_id);
        return;
    };
    let Some(project) = projects.iter().find(|p| p.id == id) else {
        println!("Project {} not found.\n", id);
        return;
    };

    let rows = match loader::load_rows(&project.file_path) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", project.file_path, e);
            return;
        }
    };
    if rows.len() <= 1 {
        println!("No checklist rows in {}.\n", project.file_path);
        return;
    }

    let (items, report) = normalize::normalize(&rows, &project.project_name);
    println!(
        "\nProcessing checklist... ({} rows scanned, {} items, {} blank rows skipped)\n",
        format_int(report.total_rows as i64),
        format_int(report.item_rows as i64),
        format_int(report.blank_rows as i64)
    );
    let rollup = summary::aggregate(&items);

    if let Err(e) = output::write_csv("project_items.csv", &items) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary for {} (items exported to project_items.csv)\n", project.project_name);
    print_rollup(&rollup);

    let category = read_input("Category to drill into (blank to skip): ");
    if !category.is_empty() {
        let rows = output::breakdown_rows(&rollup, &category);
        if rows.is_empty() {
            println!("No category named {:?}.\n", category);
        } else {
            output::preview_table_rows(&rows, usize::MAX);
        }
    }
}

fn read_period() -> Option<(PeriodSelector, Option<DateRange>)> {
    println!("Period: [1] All  [2] 1 month  [3] 2 months  [4] 3 months  [5] 6 months  [6] 1 year  [7] Custom");
    let selector = match read_input("Enter choice: ").as_str() {
        "1" => PeriodSelector::All,
        "2" => PeriodSelector::OneMonth,
        "3" => PeriodSelector::TwoMonths,
        "4" => PeriodSelector::ThreeMonths,
        "5" => PeriodSelector::SixMonths,
        "6" => PeriodSelector::OneYear,
        "7" => PeriodSelector::Custom,
        other => {
            println!("Invalid choice: {}\n", other);
            return None;
        }
    };
    if selector != PeriodSelector::Custom {
        return Some((selector, None));
    }
    let start_raw = read_input("Start date (YYYY-MM-DD): ");
    let end_raw = read_input("End date (YYYY-MM-DD): ");
    let start = util::parse_date_safe(Some(start_raw.as_str()));
    let end = util::parse_date_safe(Some(end_raw.as_str()));
    match (start, end) {
        (Some(start), Some(end)) => Some((selector, Some(DateRange { start, end }))),
        _ => {
            println!("Both dates are required, in YYYY-MM-DD form.\n");
            None
        }
    }
}

/// Handle option [3]: the period-filtered rollup across all projects.
///
/// This function is intentionally side-effectful: it writes two CSV
/// tables plus a JSON digest, and prints previews of each.
fn handle_overall_summary() {
    let Some(projects) = loaded_projects() else {
        println!("Error: No projects loaded. Please load the project list first (option 1).\n");
        return;
    };
    let Some((selector, custom)) = read_period() else {
        return;
    };

    let now = Local::now().naive_local();
    println!("\nAggregating {} projects...\n", format_int(projects.len() as i64));
    let rollup = summary::compute_multi_project_summary(&projects, selector, custom.as_ref(), now);

    print_rollup(&rollup);

    let categories = output::category_rows(&rollup);
    if let Err(e) = output::write_csv("summary_by_category.csv", &categories) {
        eprintln!("Write error: {}", e);
    }
    let owners = output::owner_rows(&rollup);
    if let Err(e) = output::write_csv("summary_by_owner.csv", &owners) {
        eprintln!("Write error: {}", e);
    }
    if let Err(e) = output::write_json("summary.json", &output::summary_export(&rollup)) {
        eprintln!("Write error: {}", e);
    }
    println!("(Tables exported to summary_by_category.csv, summary_by_owner.csv, summary.json)\n");

    let owner = read_input("Owner to drill into (blank to skip): ");
    if !owner.is_empty() {
        let rows = output::owner_project_rows(&rollup, &owner);
        if rows.is_empty() {
            println!("No per-project scores for {:?}.\n", owner);
        } else {
            output::preview_table_rows(&rows, usize::MAX);
        }
    }
}

fn main() {
    env_logger::init();
    loop {
        println!("Inspection Summary:");
        println!("[1] Load project list");
        println!("[2] Project summary");
        println!("[3] Overall summary\n");
        match read_input("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_project_summary();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!("");
                handle_overall_summary();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
}
