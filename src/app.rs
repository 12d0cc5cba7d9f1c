//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the analysis pipeline
//! - prints the summary and optional plot
//! - writes the report, figures and optional JSON export

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::cli::Cli;
use crate::error::AppError;
use crate::plot::{HEATMAP_FILE_NAME, PLOTS_FILE_NAME, RenderWarning};
use crate::report::{REPORT_FILE_NAME, output_path};

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `proxi` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return Ok(());
        }
        Err(err) => {
            let _ = err.print();
            return Err(AppError::input_missing("invalid command-line arguments"));
        }
    };

    check_input(&cli.csv_path)?;
    let config = cli.analysis_config();
    let run = pipeline::run_analysis(&cli.csv_path, &config)?;

    println!("{}", crate::report::format_run_summary(&run.result));

    if cli.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.observations,
            &run.result.signal_model,
            &config,
            cli.width,
            cli.height,
        );
        println!("{plot}");
    }

    let (warnings, report) = write_outputs(&cli.csv_path, &run, Local::now().naive_local());
    if !warnings.is_empty() {
        info!("{} output file(s) could not be written", warnings.len());
    }

    if let Some(path) = &cli.export_json {
        crate::io::export::write_result_json(path, &run.result)?;
    }

    // A failed report still fails the run, after the other outputs were attempted.
    let report_path = report?;
    println!("Report: {}", report_path.display());

    Ok(())
}

/// Write the figures, heatmap and report next to `input`.
///
/// Every failure is logged as soon as it happens and collected; only the
/// report result is handed back for the exit code.
fn write_outputs(
    input: &Path,
    run: &RunOutput,
    generated_at: NaiveDateTime,
) -> (Vec<RenderWarning>, Result<PathBuf, AppError>) {
    let mut warnings = Vec::new();
    let mut record = |w: RenderWarning| {
        warn!("{w}");
        warnings.push(w);
    };

    let plots_path = output_path(input, PLOTS_FILE_NAME);
    match crate::plot::render_distance_plots(&plots_path, &run.observations, &run.groups, &run.result) {
        Ok(()) => info!("Wrote figures to {}", plots_path.display()),
        Err(e) => record(RenderWarning::new(PLOTS_FILE_NAME, e.to_string())),
    }

    let heatmap_path = output_path(input, HEATMAP_FILE_NAME);
    match crate::plot::render_correlation_heatmap(&heatmap_path, &run.result.correlation) {
        Ok(()) => info!("Wrote correlation heatmap to {}", heatmap_path.display()),
        Err(e) => record(RenderWarning::new(HEATMAP_FILE_NAME, e.to_string())),
    }

    let report = crate::report::write_report(input, &run.result, generated_at);
    if let Err(e) = &report {
        record(RenderWarning::new(REPORT_FILE_NAME, e.message()));
    }

    (warnings, report)
}

/// Logs go to stderr at `info` unless `RUST_LOG` says otherwise.
fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .try_init();
}

fn check_input(path: &Path) -> Result<(), AppError> {
    if !path.exists() {
        return Err(AppError::input_missing(format!("File not found: {}", path.display())));
    }
    if !path.is_file() {
        return Err(AppError::input_missing(format!("Not a file: {}", path.display())));
    }
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        warn!("{} does not have a .csv extension; attempting to parse anyway", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_exit_code_one() {
        let path = std::env::temp_dir().join("proxi-definitely-missing-input.csv");
        let err = check_input(&path).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.message().starts_with("File not found"));
    }

    #[test]
    fn unwritable_outputs_become_warnings_and_report_fails_with_four() {
        let csv = "rssi,contactDuration,distanceInMeter\n-45,30,0.5\n-60,20,1.5\n-70,10,4.0\n";
        let data = crate::io::ingest::load_records_from_reader(csv.as_bytes(), "log.csv").unwrap();
        let run = pipeline::analyze_ingested(data, &crate::config::AnalysisConfig::default());

        let input = std::env::temp_dir()
            .join(format!("proxi-no-such-dir-{}", std::process::id()))
            .join("log.csv");
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap();
        let (warnings, report) = write_outputs(&input, &run, at);

        let outputs: Vec<&str> = warnings.iter().map(|w| w.output.as_str()).collect();
        assert_eq!(outputs, [PLOTS_FILE_NAME, HEATMAP_FILE_NAME, REPORT_FILE_NAME]);
        assert_eq!(report.unwrap_err().exit_code(), 4);
    }

    #[test]
    fn directory_is_rejected_and_other_extensions_pass() {
        let dir = std::env::temp_dir().join(format!("proxi-app-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert_eq!(check_input(&dir).unwrap_err().exit_code(), 1);

        let txt = dir.join("log.txt");
        std::fs::write(&txt, "rssi\n-50\n").unwrap();
        assert!(check_input(&txt).is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
