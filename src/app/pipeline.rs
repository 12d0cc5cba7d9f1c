//! The analysis pipeline, independent of how results are presented.
//!
//! load CSV -> derive metrics -> partition by distance -> analyze
//!
//! The CLI layer then focuses on presentation (printing, files).

use std::path::Path;

use log::info;

use crate::analysis::{AnalysisResult, DistanceGroup, analyze, partition};
use crate::config::AnalysisConfig;
use crate::derive::{Observation, derive_all};
use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_records};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub observations: Vec<Observation>,
    pub groups: Vec<DistanceGroup>,
    pub result: AnalysisResult,
}

/// Execute the full analysis for one input file.
pub fn run_analysis(path: &Path, config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let ingest = load_records(path)?;
    Ok(analyze_ingested(ingest, config))
}

/// Run everything after loading. Never fails: missing data degrades sections instead.
pub fn analyze_ingested(ingest: IngestedData, config: &AnalysisConfig) -> RunOutput {
    let observations = derive_all(&ingest.records, &ingest.columns, config);

    let groups = partition(&observations);
    info!(
        "Created distance groups: {}",
        groups
            .iter()
            .map(|g| format!("{}={}", g.band.label(), g.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let result = analyze(&ingest, &observations, &groups, config);

    RunOutput {
        ingest,
        observations,
        groups,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use crate::domain::DistanceBand;
    use crate::fit::{SignalModelOutcome, UnavailableReason};
    use crate::report::{REPORT_FILE_NAME, build_report, write_report};

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("proxi-pipeline-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_fixture(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("contacts.csv");
        fs::write(&path, body).unwrap();
        path
    }

    fn stamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap()
    }

    const FOUR_RECORDS: &str = "\
timeStamp,peerId,rssi,deviceId,uploadDuration,contactDuration,closeContactDuration,exposureStatus,distanceInMeter
1700000000,aa,-40,ESP32_A,100,120,60,NORMAL,0.5
1700000060,bb,-55,ESP32_A,110,90,30,EXPOSURE,1.5
1700000120,cc,-65,ESP32_A,95,45,0,NORMAL,3.0
1700000180,dd,-75,ESP32_A,90,20,0,NORMAL,6.0
";

    #[test]
    fn four_record_scenario() {
        let dir = fixture_dir("four");
        let path = write_fixture(&dir, FOUR_RECORDS);
        let run = run_analysis(&path, &AnalysisConfig::default()).unwrap();

        assert_eq!(run.observations.len(), 4);
        let bands: Vec<DistanceBand> = run.groups.iter().map(|g| g.band).collect();
        assert_eq!(bands, DistanceBand::ALL.to_vec());
        assert!(run.groups.iter().all(|g| g.len() == 1));
        assert!(run.result.groups.iter().all(|g| g.sample_count == 1));

        assert_eq!(run.result.overall_exposure_rate, Some(25.0));
        assert_eq!(run.result.groups[1].exposure_rate, Some(100.0));
        assert_eq!(run.result.groups[0].exposure_rate, Some(0.0));

        let model = run.result.signal_model.fitted().unwrap();
        assert_eq!(model.sample_size, 4);
        let log = model.path_loss.unwrap().model;
        assert!(log.slope < 0.0);
        // Monotonically decreasing fitted curve.
        let floor = run.result.config.distance_floor_m;
        let ys: Vec<f64> = [0.5, 1.0, 2.0, 4.0, 8.0]
            .iter()
            .map(|&d| log.predict(d, floor))
            .collect();
        assert!(ys.windows(2).all(|w| w[1] < w[0]));

        assert_eq!(run.result.dataset.source_name, "contacts.csv");
        assert_eq!(run.result.dataset.distance_range, Some((0.5, 6.0)));

        let written = write_report(&path, &run.result, stamp()).unwrap();
        assert_eq!(written, dir.join(REPORT_FILE_NAME));
        let report = fs::read_to_string(&written).unwrap();
        assert!(report.contains("## RSSI vs Distance Relationship"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn insufficient_data_scenario() {
        let dir = fixture_dir("sparse");
        let path = write_fixture(
            &dir,
            "timeStamp,rssi,exposureStatus,distanceInMeter\n\
             1700000000,-50,NORMAL,1.2\n\
             1700000060,,NORMAL,2.5\n\
             1700000120,-70,EXPOSURE,\n\
             timeStamp,rssi,exposureStatus,distanceInMeter\n",
        );
        let run = run_analysis(&path, &AnalysisConfig::default()).unwrap();

        // The repeated header row is dropped.
        assert_eq!(run.ingest.rows_dropped, 1);
        assert_eq!(run.observations.len(), 3);
        assert_eq!(
            run.result.signal_model,
            SignalModelOutcome::Unavailable {
                sample_size: 1,
                reason: UnavailableReason::InsufficientData
            }
        );

        let report = build_report(&run.result, stamp());
        assert!(!report.contains("## RSSI vs Distance Relationship"));
        assert!(report.contains("## Data Quality Assessment"));
        assert!(write_report(&path, &run.result, stamp()).is_ok());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_and_empty_inputs_fail() {
        let dir = fixture_dir("errors");

        let err = run_analysis(&dir.join("absent.csv"), &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let path = write_fixture(&dir, "timeStamp,rssi,distanceInMeter\nnot-a-time,-50,1.0\n");
        let err = run_analysis(&path, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let _ = fs::remove_dir_all(&dir);
    }
}
