//! Export the full analysis result as JSON.
//!
//! The export mirrors `AnalysisResult` field for field, so downstream scripts
//! can read group statistics and model coefficients without parsing Markdown.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;

use crate::analysis::AnalysisResult;
use crate::error::AppError;

/// Write the analysis result as pretty-printed JSON.
pub fn write_result_json(path: &Path, result: &AnalysisResult) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create JSON export '{}': {e}", path.display())))?;

    write_result_json_to(file, result)?;
    info!("Wrote JSON export to {}", path.display());
    Ok(())
}

pub fn write_result_json_to<W: Write>(mut writer: W, result: &AnalysisResult) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, result)
        .map_err(|e| AppError::output(format!("Failed to write JSON export: {e}")))?;
    writeln!(writer).map_err(|e| AppError::output(format!("Failed to write JSON export: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::analyze_ingested;
    use crate::config::AnalysisConfig;
    use crate::io::ingest::load_records_from_reader;

    #[test]
    fn export_carries_groups_and_model_status() {
        let csv = "rssi,exposureStatus,distanceInMeter\n-45,NORMAL,0.5\n-60,EXPOSURE,1.5\n-70,NORMAL,4.0\n";
        let data = load_records_from_reader(csv.as_bytes(), "export.csv").unwrap();
        let run = analyze_ingested(data, &AnalysisConfig::default());

        let mut buf = Vec::new();
        write_result_json_to(&mut buf, &run.result).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(json["dataset"]["source_name"], "export.csv");
        assert_eq!(json["groups"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["signal_model"]["status"], "fitted");
        assert_eq!(json["signal_model"]["sample_size"], 3);
    }
}
