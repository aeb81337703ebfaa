// Entry point and interactive menu.
//
// - Option [1] loads the projects file (and the ledger, if configured).
// - Option [2] evaluates every project, writes the ranking and summary,
//   and stores the complete reports for reuse.
// - Option [3] lists implausible inputs without changing any report.
use anyhow::Result;
use chrono::Local;
use log::{info, warn};
use once_cell::sync::Lazy;
use prograin::calculator::validate_inputs;
use prograin::config::{load_config, Config};
use prograin::ledger::sum_expenses_by_project;
use prograin::loader::{load_ledger, load_projects, LoadOptions};
use prograin::output;
use prograin::reports::{evaluate_projects, generate_project_rows, generate_summary};
use prograin::snapshot::SnapshotStore;
use prograin::types::ProjectRecord;
use prograin::util;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

// Loaded once from option [1] and reused by the other options.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<ProjectRecord>>,
}

/// `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if matches!(io::stdin().read_line(&mut buf), Ok(0) | Err(_)) {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn loaded_projects() -> Option<Vec<ProjectRecord>> {
    let state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    state.data.clone()
}

fn handle_load(config: &Config) -> Result<()> {
    let spent_by_project = match &config.input.transactions_file {
        Some(path) => {
            let (entries, skipped) = load_ledger(path)?;
            println!(
                "Ledger: {} movements read, {} skipped.",
                util::format_int(entries.len() as u64),
                util::format_int(skipped as u64)
            );
            Some(sum_expenses_by_project(&entries))
        }
        None => None,
    };

    let options = LoadOptions {
        as_of: config.report.as_of_or_today(),
        default_duration_months: config.report.default_duration_months,
    };
    let (data, load_report) =
        load_projects(&config.input.projects_file, &options, spent_by_project.as_ref())?;

    println!(
        "Processing projects... ({} rows read, {} loaded)",
        util::format_int(load_report.total_rows as u64),
        util::format_int(load_report.loaded_rows as u64)
    );
    println!(
        "Note: {} rows skipped due to parse/validation errors.",
        util::format_int(load_report.parse_errors as u64)
    );
    if load_report.defaulted_start_dates > 0 || load_report.defaulted_durations > 0 {
        println!(
            "Info: defaulted {} start dates and {} durations.",
            load_report.defaulted_start_dates, load_report.defaulted_durations
        );
    }
    if load_report.spend_from_ledger > 0 {
        println!(
            "Info: spend taken from the ledger for {} projects.",
            load_report.spend_from_ledger
        );
    }
    println!();
    info!("evaluation date {}", options.as_of);

    let mut state = APP_STATE.lock().unwrap_or_else(|e| e.into_inner());
    state.data = Some(data);
    Ok(())
}

fn handle_generate_reports(config: &Config) -> Result<()> {
    let Some(data) = loaded_projects() else {
        println!("Error: No data loaded. Please load the projects file first (option 1).\n");
        return Ok(());
    };

    let snapshot_path = &config.report.snapshot_file;
    let mut store = match SnapshotStore::load(snapshot_path, config.report.snapshot_max_age_days) {
        Ok(store) => store,
        Err(e) => {
            warn!("ignoring unreadable snapshot file: {}", e);
            SnapshotStore::new(config.report.snapshot_max_age_days)
        }
    };
    let now = Local::now().naive_local();

    println!("Generating reports...\n");
    let evaluated = evaluate_projects(&data, |r| store.get_or_compute(&r.project_id, &r.snapshot, now));

    let rows = generate_project_rows(&evaluated);
    let rows_path = config.output.dir.join("rendimiento_obras.csv");
    output::write_csv(&rows_path, &rows)?;
    println!("Project Performance Ranking");
    println!("(Sorted by global performance)\n");
    output::preview_table_rows(&rows, config.output.preview_rows);
    println!("(Full table exported to {})\n", rows_path.display());

    let summary = generate_summary(&evaluated);
    let summary_path = config.output.dir.join("resumen_rendimiento.json");
    output::write_json(&summary_path, &summary)?;
    println!("Summary ({}):", summary_path.display());
    println!(
        "{{\"avg_global_performance\": {}, \"total_projected_overrun\": {}, \"critical\": {}}}\n",
        util::format_number(summary.avg_global_performance, 2),
        util::format_number(summary.total_projected_overrun, 2),
        summary.critical_projects.len()
    );

    if let Err(e) = store.save(snapshot_path) {
        warn!("could not save snapshots to {}: {}", snapshot_path.display(), e);
    }
    Ok(())
}

fn handle_validate(config: &Config) {
    let Some(data) = loaded_projects() else {
        println!("Error: No data loaded. Please load the projects file first (option 1).\n");
        return;
    };
    let as_of = config.report.as_of_or_today();
    let mut flagged = 0usize;
    for record in &data {
        let issues = validate_inputs(&record.snapshot, as_of);
        if issues.is_empty() {
            continue;
        }
        flagged += 1;
        println!("{} ({}):", record.name, record.project_id);
        for issue in issues {
            println!("  - {}", issue);
        }
    }
    println!(
        "{} of {} projects have implausible inputs.\n",
        util::format_int(flagged as u64),
        util::format_int(data.len() as u64)
    );
}

fn main() -> Result<()> {
    env_logger::init();

    let cwd = std::env::current_dir()?;
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(explicit.as_deref(), &cwd)?;

    loop {
        println!("PROGRAIN - Project Performance");
        println!("[1] Load the projects file");
        println!("[2] Generate reports");
        println!("[3] Validate inputs\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = handle_load(&config) {
                    eprintln!("Failed to load file: {:#}\n", e);
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&config) {
                    eprintln!("Report error: {:#}\n", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_validate(&config),
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
            }
        }
    }
    Ok(())
}
