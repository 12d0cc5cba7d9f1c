//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized

use crate::analysis::AnalysisResult;
use crate::domain::Field;
use crate::fit::SignalModelOutcome;

/// Format the run summary printed after a successful analysis.
pub fn format_run_summary(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let ds = &result.dataset;

    out.push_str("=== proxi - Contact Tracing Distance Analysis ===\n");
    out.push_str(&format!("Source: {}\n", ds.source_name));
    out.push_str(&format!(
        "Records: n={} | read={} dropped={}\n",
        ds.total_records, ds.rows_read, ds.rows_dropped
    ));
    if let Some((lo, hi)) = ds.distance_range {
        out.push_str(&format!("Distance: [{lo:.2}, {hi:.2}] m\n"));
    }

    out.push_str("\nDistance groups:\n");
    out.push_str(
        format!(
            "{:<8} {:>7} {:>10} {:>12} {:>10}\n",
            "group", "n", "rssi", "contact(s)", "exposure%"
        )
        .trim_end(),
    );
    out.push('\n');
    for g in &result.groups {
        out.push_str(
            format!(
                "{:<8} {:>7} {:>10} {:>12} {:>10}\n",
                g.label,
                g.sample_count,
                fmt_opt(g.field(Field::Rssi).map(|s| s.mean)),
                fmt_opt(g.field(Field::ContactDuration).map(|s| s.mean)),
                fmt_opt(g.exposure_rate),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if let Some(rate) = result.overall_exposure_rate {
        out.push_str(&format!("Overall exposure rate: {rate:.1}%\n"));
    }

    out.push_str("\nSignal model:\n");
    match &result.signal_model {
        SignalModelOutcome::Fitted(m) => {
            out.push_str(&format!(
                "  r={:.3} (p={:.4}) {} {}\n",
                m.correlation.r,
                m.correlation.p_value,
                m.correlation.strength.label(),
                m.correlation.direction.label()
            ));
            for fit in std::iter::once(&m.linear).chain(m.path_loss.as_ref().map(|pl| &pl.model)) {
                out.push_str(&format!(
                    "  {:<18} slope={:>8.3} intercept={:>8.3} R2={:.3}\n",
                    fit.kind.display_name(),
                    fit.slope,
                    fit.intercept,
                    fit.r_squared
                ));
            }
            match &m.path_loss {
                Some(pl) => out.push_str(&format!(
                    "  path loss exponent n={:.2} ({})\n",
                    pl.exponent,
                    pl.environment.label()
                )),
                None => out.push_str("  path loss exponent n=N/A (all distances at or below floor)\n"),
            }
            if let Some(err) = &m.theoretical_error {
                out.push_str(&format!(
                    "  vs theoretical: RMSE={:.2} MAE={:.2} dBm ({} accuracy)\n",
                    err.rmse,
                    err.mae,
                    err.accuracy.label()
                ));
            }
        }
        SignalModelOutcome::Unavailable { sample_size, reason } => {
            out.push_str(&format!("  unavailable: {} (n={sample_size})\n", reason.describe()));
        }
    }

    out.push_str(&format!(
        "\nData quality: {} ({:.1}% missing)\n",
        result.summary.data_quality.rating.label(),
        result.summary.data_quality.missing_percentage
    ));

    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.1}")).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, partition};
    use crate::config::AnalysisConfig;
    use crate::derive::derive_all;
    use crate::io::ingest::load_records_from_reader;

    fn result_for(csv: &str) -> AnalysisResult {
        let cfg = AnalysisConfig::default();
        let data = load_records_from_reader(csv.as_bytes(), "run.csv").unwrap();
        let obs = derive_all(&data.records, &data.columns, &cfg);
        let groups = partition(&obs);
        analyze(&data, &obs, &groups, &cfg)
    }

    #[test]
    fn summary_lists_groups_and_model() {
        let result = result_for("rssi,distanceInMeter\n-40,0.5\n-55,1.5\n-65,3.0\n-75,6.0\n");
        let txt = format_run_summary(&result);

        assert!(txt.starts_with("=== proxi - Contact Tracing Distance Analysis ===\n"));
        assert!(txt.contains("Records: n=4 | read=4 dropped=0\n"));
        assert!(txt.contains("0-1m           1      -40.0          N/A        N/A\n"));
        assert!(txt.contains("path loss exponent n="));
        assert!(!txt.contains("Overall exposure rate"));
        assert!(txt.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn summary_reports_unavailable_model() {
        let result = result_for("rssi,distanceInMeter\n-40,0.5\n");
        let txt = format_run_summary(&result);
        assert!(txt.contains("  unavailable: insufficient valid data for RSSI-distance analysis (n=1)\n"));
    }
}
