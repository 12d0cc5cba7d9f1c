//! Markdown analysis report.
//!
//! `build_report` is a pure function of the `AnalysisResult`; it never
//! recomputes a statistic. Sections whose inputs are unavailable are either
//! omitted (the RSSI-distance section) or print `N/A`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::info;

use crate::analysis::{AnalysisResult, GroupSummary};
use crate::domain::Field;
use crate::error::AppError;
use crate::fit::{SignalDistanceModel, SignalModelOutcome};
use crate::plot::{HEATMAP_FILE_NAME, PLOTS_FILE_NAME};

pub const REPORT_FILE_NAME: &str = "distance_analysis_report.md";

/// Render the full report.
pub fn build_report(result: &AnalysisResult, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();

    out.push_str("# Contact Tracing Distance Analysis Report\n\n");
    out.push_str("---\n\n");

    write_dataset_info(&mut out, result, generated_at);
    write_group_analysis(&mut out, result);
    if let SignalModelOutcome::Fitted(model) = &result.signal_model {
        write_signal_model(&mut out, model);
    }
    write_descriptive(&mut out, result);
    write_key_findings(&mut out, result);
    write_data_quality(&mut out, result);
    write_methodology(&mut out, result);

    out.push_str("---\n");
    let _ = writeln!(out, "*Report generated on {}*", generated_at.format("%Y-%m-%d at %H:%M:%S"));

    out
}

/// Write the report next to `input` and return its path.
pub fn write_report(input: &Path, result: &AnalysisResult, generated_at: NaiveDateTime) -> Result<PathBuf, AppError> {
    let path = output_path(input, REPORT_FILE_NAME);
    let body = build_report(result, generated_at);
    fs::write(&path, body)
        .map_err(|e| AppError::output(format!("Failed to write report '{}': {e}", path.display())))?;
    info!("Wrote report to {}", path.display());
    Ok(path)
}

/// Path of an output file placed in the same directory as `input`.
pub fn output_path(input: &Path, file_name: &str) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

fn write_dataset_info(out: &mut String, result: &AnalysisResult, generated_at: NaiveDateTime) {
    let ds = &result.dataset;
    out.push_str("## Dataset Information\n\n");
    let _ = writeln!(out, "- **Data Source:** `{}`", ds.source_name);
    let _ = writeln!(out, "- **Analysis Date:** {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "- **Total Records:** {}", thousands(ds.total_records));
    if ds.rows_dropped > 0 {
        let _ = writeln!(
            out,
            "- **Rows Dropped:** {} of {} (non-numeric timestamp or malformed row)",
            thousands(ds.rows_dropped),
            thousands(ds.rows_read)
        );
    }
    let _ = writeln!(out, "- **Numeric Columns:** {}", ds.fields.len());
    match ds.distance_range {
        Some((lo, hi)) => {
            let _ = writeln!(out, "- **Distance Range:** {lo:.1}m to {hi:.1}m");
        }
        None => out.push_str("- **Distance Range:** N/A\n"),
    }
    let names: Vec<&str> = ds.fields.iter().map(|f| f.column_name()).collect();
    let _ = writeln!(out, "- **Columns Analyzed:** {}\n", names.join(", "));
}

fn write_group_analysis(out: &mut String, result: &AnalysisResult) {
    out.push_str("## Distance-Based Analysis\n\n");
    out.push_str("Analysis of contact tracing metrics grouped by distance ranges:\n\n");
    out.push_str("| Distance Group | Sample Size | Avg RSSI (dBm) | Avg Contact Duration (s) | Exposure Rate (%) |\n");
    out.push_str("|----------------|-------------|----------------|--------------------------|-------------------|\n");
    for g in &result.groups {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            g.label,
            thousands(g.sample_count),
            or_na(g.field(Field::Rssi).map(|s| s.mean), 1),
            or_na(g.field(Field::ContactDuration).map(|s| s.mean), 1),
            or_na(g.exposure_rate, 1),
        );
    }

    out.push_str("\n### Distance Group Insights\n\n");
    if result.groups.iter().all(|g| g.sample_count == 0) {
        out.push_str("N/A: no records have a distance value.\n\n");
    }
    for g in result.groups.iter().filter(|g| g.sample_count > 0) {
        write_group_insight(out, g);
    }
}

fn write_group_insight(out: &mut String, g: &GroupSummary) {
    let _ = writeln!(out, "**{}:**", g.label);
    if let Some(s) = g.field(Field::Rssi) {
        let _ = writeln!(out, "- Signal Strength: {:.1} ± {:.1} dBm", s.mean, s.std_dev);
    }
    if let Some(s) = g.field(Field::ContactDuration) {
        let _ = writeln!(out, "- Contact Duration: {:.1} ± {:.1} seconds", s.mean, s.std_dev);
    }
    if let Some(s) = g.field(Field::CloseContactDuration) {
        let _ = writeln!(out, "- Close Contact Duration: {:.1} ± {:.1} seconds", s.mean, s.std_dev);
    }
    if let Some(rate) = g.exposure_rate {
        let _ = writeln!(out, "- Exposure Risk: {rate:.1}% of contacts");
    }
    out.push('\n');
}

fn write_signal_model(out: &mut String, m: &SignalDistanceModel) {
    out.push_str("## RSSI vs Distance Relationship\n\n");

    out.push_str("### Correlation Analysis\n\n");
    let c = &m.correlation;
    let _ = writeln!(out, "- **Pearson Correlation:** r = {:.3} (p = {:.4})", c.r, c.p_value);
    let _ = writeln!(out, "- **Relationship:** {} {} correlation", c.strength.label(), c.direction.label());
    let _ = writeln!(out, "- **Sample Size:** {} data points\n", thousands(m.sample_size));

    out.push_str("### Model Fitting Results\n\n");
    let lin = &m.linear;
    let _ = writeln!(
        out,
        "**Linear Model:** RSSI = {:.2} × distance + {:.2}",
        lin.slope, lin.intercept
    );
    let _ = writeln!(out, "- R² = {:.3}", lin.r_squared);
    let trend = if lin.slope <= 0.0 { "decreases" } else { "increases" };
    let _ = writeln!(out, "- Interpretation: RSSI {trend} by {:.2} dBm per meter\n", lin.slope.abs());

    match &m.path_loss {
        Some(pl) => {
            let log = &pl.model;
            let _ = writeln!(
                out,
                "**Path Loss Model:** RSSI = {:.2} × log₁₀(distance) + {:.2}",
                log.slope, log.intercept
            );
            let _ = writeln!(out, "- R² = {:.3}", log.r_squared);
            let _ = writeln!(out, "- Path Loss Exponent: n = {:.2}", pl.exponent);
            let _ = writeln!(out, "- **Environment Assessment:** {}\n", pl.environment.label());
        }
        None => out.push_str("**Path Loss Model:** N/A (every distance is at or below the log-distance floor)\n\n"),
    }

    if let Some(err) = &m.theoretical_error {
        out.push_str("### Model Accuracy\n\n");
        let _ = writeln!(out, "- **RMSE:** {:.2} dBm", err.rmse);
        let _ = writeln!(out, "- **MAE:** {:.2} dBm", err.mae);
        let _ = writeln!(out, "- **Model Accuracy:** {}\n", err.accuracy.label());
    }
}

fn write_descriptive(out: &mut String, result: &AnalysisResult) {
    out.push_str("## Descriptive Statistics Summary\n\n");
    let summary = &result.summary;

    match &summary.distance {
        Some(d) => {
            out.push_str("### Distance Metrics\n\n");
            let _ = writeln!(out, "- **Mean Distance:** {:.2} ± {:.2} meters", d.mean, d.std_dev);
            let _ = writeln!(out, "- **Median Distance:** {:.2} meters", d.median);
            let _ = writeln!(out, "- **Distance Range:** [{:.1}, {:.1}] meters", d.min, d.max);
            let _ = writeln!(out, "- **Interquartile Range:** [{:.2}, {:.2}] meters\n", d.q1, d.q3);
        }
        None => out.push_str("### Distance Metrics\n\n- N/A\n\n"),
    }

    match &summary.rssi {
        Some(r) => {
            let d = &r.distribution;
            out.push_str("### Signal Strength Metrics\n\n");
            let _ = writeln!(out, "- **Mean RSSI:** {:.1} ± {:.1} dBm", d.mean, d.std_dev);
            let _ = writeln!(out, "- **Median RSSI:** {:.1} dBm", d.median);
            let _ = writeln!(out, "- **RSSI Range:** [{:.1}, {:.1}] dBm", d.min, d.max);
            let _ = writeln!(out, "- **Overall Signal Quality:** {}\n", r.quality.label());
        }
        None => out.push_str("### Signal Strength Metrics\n\n- N/A\n\n"),
    }
}

fn write_key_findings(out: &mut String, result: &AnalysisResult) {
    out.push_str("## Key Findings\n\n");

    if let Some(p) = &result.summary.proximity {
        out.push_str("### Proximity Analysis\n");
        let _ = writeln!(
            out,
            "- **Close Contacts (≤2m):** {} contacts ({:.1}%)",
            thousands(p.close_contacts),
            p.close_contact_percentage
        );
        let _ = writeln!(out, "- **Average Contact Distance:** {:.1} meters", p.mean_distance);
        let _ = writeln!(out, "- **Environment Type:** {}\n", p.level.label());
    }

    if let Some(m) = result.signal_model.fitted() {
        out.push_str("### Signal Propagation\n");
        let _ = writeln!(out, "- **Distance-RSSI Correlation:** r = {:.3}", m.correlation.r);
        match &m.path_loss {
            Some(pl) => {
                let _ = writeln!(out, "- **Path Loss Exponent:** n = {:.2}", pl.exponent);
                let _ = writeln!(
                    out,
                    "- **Signal Predictability:** {} (R² = {:.3})\n",
                    pl.predictability.label(),
                    pl.model.r_squared
                );
            }
            None => out.push_str("- **Path Loss Exponent:** N/A\n- **Signal Predictability:** N/A\n\n"),
        }
    }

    let rates: Vec<(&str, f64)> = result
        .groups
        .iter()
        .filter_map(|g| g.exposure_rate.map(|r| (g.label.as_str(), r)))
        .collect();
    if !rates.is_empty() {
        out.push_str("### Exposure Risk by Distance\n");
        for (label, rate) in rates {
            let _ = writeln!(out, "- **{label}:** {rate:.1}% exposure rate");
        }
        if let Some(overall) = result.overall_exposure_rate {
            let _ = writeln!(out, "- **Overall:** {overall:.1}% exposure rate");
        }
        out.push('\n');
    }
}

fn write_data_quality(out: &mut String, result: &AnalysisResult) {
    let q = &result.summary.data_quality;
    out.push_str("## Data Quality Assessment\n\n");
    let _ = writeln!(
        out,
        "- **Missing Data:** {} values ({:.1}% of total)",
        thousands(q.missing_cells),
        q.missing_percentage
    );
    if let Some(c) = q.distance_completeness {
        let _ = writeln!(out, "- **Distance Data Completeness:** {c:.1}%");
    }
    if let (Some(count), Some(pct)) = (q.zero_distance_count, q.zero_distance_percentage) {
        if count > 0 {
            let _ = writeln!(out, "- **Zero Distance Measurements:** {count} ({pct:.1}%)");
        }
    }
    if result.dataset.row_warnings > 0 {
        let _ = writeln!(out, "- **Row Warnings:** {}", thousands(result.dataset.row_warnings));
    }
    let _ = writeln!(out, "- **Overall Data Quality:** {}\n", q.rating.label());
}

fn write_methodology(out: &mut String, result: &AnalysisResult) {
    let cfg = &result.config;

    out.push_str("## Methodology\n\n");
    out.push_str("### Analysis Methods\n");
    out.push_str("- **Distance Grouping:** Data segmented into 0-1m, 1-2m, 2-5m, and >5m ranges\n");
    out.push_str("- **Signal Modeling:** Linear and logarithmic models fitted to RSSI vs distance\n");
    out.push_str("- **Path Loss Analysis:** Free Space Path Loss model comparison\n");
    out.push_str("- **Correlation Analysis:** Pearson correlation for RSSI-distance relationship\n");
    out.push_str("- **Statistical Testing:** Two-sided t-test on the correlation coefficient\n\n");

    out.push_str("### Theoretical Framework\n");
    out.push_str("- **Free Space Path Loss (FSPL):** Based on electromagnetic wave propagation theory\n");
    out.push_str("  - Formula: `FSPL(dB) = 32.45 + 20×log₁₀(f_MHz) + 20×log₁₀(d_km)`\n");
    let _ = writeln!(
        out,
        "  - For 2.4GHz BLE: `FSPL ≈ {} + 20×log₁₀(d_m)` at 1m reference",
        cfg.fspl_constant_db
    );
    let _ = writeln!(
        out,
        "  - Theoretical RSSI: `RSSI = Tx_Power - FSPL` (assuming {} dBm Tx power)",
        cfg.tx_power_dbm
    );
    out.push_str("- **Path Loss Model:** `RSSI = -10×n×log₁₀(d) + C`, where n is path loss exponent\n");
    let _ = writeln!(
        out,
        "- **Distance Floor:** distances below {} m are clamped before taking log₁₀",
        cfg.distance_floor_m
    );
    out.push_str("- **Distance Categories:** Based on social distancing and contact tracing guidelines\n");
    out.push_str("- **ESP32 BLE Parameters:** 2.4GHz frequency, ~0 dBm typical transmit power\n\n");

    out.push_str("## Files Generated\n");
    let _ = writeln!(out, "- `{REPORT_FILE_NAME}` - This comprehensive report");
    let _ = writeln!(out, "- `{PLOTS_FILE_NAME}` - Multi-panel distance analysis visualizations");
    let _ = writeln!(out, "- `{HEATMAP_FILE_NAME}` - Correlation matrix with distance metrics\n");
}

fn or_na(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}

/// `1234567` -> `1,234,567`.
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::analysis::{analyze, partition};
    use crate::config::AnalysisConfig;
    use crate::derive::derive_all;
    use crate::io::ingest::load_records_from_reader;

    fn result_for(csv: &str) -> AnalysisResult {
        let cfg = AnalysisConfig::default();
        let data = load_records_from_reader(csv.as_bytes(), "contacts.csv").unwrap();
        let obs = derive_all(&data.records, &data.columns, &cfg);
        let groups = partition(&obs);
        analyze(&data, &obs, &groups, &cfg)
    }

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|d| d.and_hms_opt(9, 26, 53))
            .unwrap()
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn full_report_has_sections_in_order() {
        let result = result_for(
            "timeStamp,rssi,contactDuration,closeContactDuration,exposureStatus,distanceInMeter\n\
             1700000000,-40,100,80,NORMAL,0.5\n\
             1700000060,-55,60,30,EXPOSURE,1.5\n\
             1700000120,-65,30,0,NORMAL,3.0\n\
             1700000180,-75,10,0,NORMAL,6.0\n",
        );
        let report = build_report(&result, stamp());

        let headings = [
            "## Dataset Information",
            "## Distance-Based Analysis",
            "## RSSI vs Distance Relationship",
            "## Descriptive Statistics Summary",
            "## Key Findings",
            "## Data Quality Assessment",
            "## Methodology",
            "## Files Generated",
        ];
        let mut last = 0;
        for h in headings {
            let pos = report.find(h).unwrap_or_else(|| panic!("missing {h}"));
            assert!(pos >= last, "{h} out of order");
            last = pos;
        }

        assert!(report.contains("- **Data Source:** `contacts.csv`"));
        assert!(report.contains("- **Analysis Date:** 2025-03-14 09:26:53"));
        assert!(report.contains("| 1-2m | 1 | -55.0 | 60.0 | 100.0 |"));
        assert!(report.contains("- **Overall:** 25.0% exposure rate"));
        assert!(report.contains("Negative correlation") || report.contains("negative correlation"));
        assert!(report.contains("`distance_analysis_plots.svg`"));
        assert!(report.ends_with("*Report generated on 2025-03-14 at 09:26:53*\n"));
    }

    #[test]
    fn empty_groups_print_na_and_model_section_is_omitted() {
        let result = result_for("rssi,distanceInMeter\n-50,0.5\n-60,\n");
        let report = build_report(&result, stamp());

        assert!(report.contains("| 0-1m | 1 | -50.0 | N/A | N/A |"));
        assert!(report.contains("| 5m+ | 0 | N/A | N/A | N/A |"));
        assert!(!report.contains("## RSSI vs Distance Relationship"));
        assert!(!report.contains("### Signal Propagation"));
        assert!(report.contains("## Data Quality Assessment"));
    }

    #[test]
    fn all_empty_groups_still_get_a_table() {
        let result = result_for("rssi,distanceInMeter\n-50,\n-60,\n");
        let report = build_report(&result, stamp());

        assert!(report.contains("## Distance-Based Analysis"));
        for band in ["0-1m", "1-2m", "2-5m", "5m+"] {
            assert!(report.contains(&format!("| {band} | 0 | N/A | N/A | N/A |")), "{band}");
        }
        assert!(report.contains("N/A: no records have a distance value."));
    }

    #[test]
    fn sub_floor_distances_report_linear_model_only() {
        let result = result_for("rssi,distanceInMeter\n-20,0.02\n-25,0.05\n-31,0.08\n");
        let report = build_report(&result, stamp());

        assert!(report.contains("## RSSI vs Distance Relationship"));
        assert!(report.contains("**Linear Model:**"));
        assert!(report.contains("**Path Loss Model:** N/A"));
        assert!(report.contains("- **Path Loss Exponent:** N/A"));
    }

    #[test]
    fn output_path_sits_next_to_input() {
        assert_eq!(
            output_path(Path::new("/data/run1/log.csv"), REPORT_FILE_NAME),
            PathBuf::from("/data/run1/distance_analysis_report.md")
        );
        assert_eq!(output_path(Path::new("log.csv"), REPORT_FILE_NAME), PathBuf::from(REPORT_FILE_NAME));
    }
}
