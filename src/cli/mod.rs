//! Command-line parsing for the contact tracing distance analyzer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! analysis code. Everything here ends up in an `AnalysisConfig` plus a few
//! presentation switches.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{AnalysisConfig, DEFAULT_FSPL_CONSTANT_DB, DEFAULT_TX_POWER_DBM};

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "proxi",
    version,
    about = "Distance-based analysis of contact tracing device logs",
    long_about = "Reads a device log CSV, groups contacts by distance, fits RSSI-distance \
                  path-loss models and writes a Markdown report plus SVG figures next to the input."
)]
pub struct Cli {
    /// Path to the device log CSV.
    pub csv_path: PathBuf,

    /// Reference transmit power P0 (dBm) for the theoretical signal model.
    #[arg(long, default_value_t = DEFAULT_TX_POWER_DBM, allow_negative_numbers = true)]
    pub tx_power: f64,

    /// Free-space path loss at 1 m (dB) for the theoretical signal model.
    #[arg(long, default_value_t = DEFAULT_FSPL_CONSTANT_DB)]
    pub fspl_constant: f64,

    /// Also write the full analysis result as JSON to this path.
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Print an ASCII scatter of RSSI vs distance.
    #[arg(long, default_value_t = false)]
    pub plot: bool,

    /// ASCII plot width (characters).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// ASCII plot height (lines).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

impl Cli {
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            tx_power_dbm: self.tx_power,
            fspl_constant_db: self.fspl_constant,
            ..AnalysisConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let cli = Cli::try_parse_from(["proxi", "log.csv"]).unwrap();
        assert_eq!(cli.csv_path, PathBuf::from("log.csv"));
        assert_eq!(cli.analysis_config(), AnalysisConfig::default());
        assert!(!cli.plot);
        assert_eq!(cli.export_json, None);
        assert_eq!((cli.width, cli.height), (80, 20));
    }

    #[test]
    fn overrides_are_applied() {
        let cli = Cli::try_parse_from([
            "proxi",
            "data/log.csv",
            "--tx-power",
            "-4",
            "--fspl-constant",
            "41.5",
            "--export-json",
            "out.json",
            "--plot",
            "--width",
            "60",
        ])
        .unwrap();
        let cfg = cli.analysis_config();
        assert_eq!(cfg.tx_power_dbm, -4.0);
        assert_eq!(cfg.fspl_constant_db, 41.5);
        assert_eq!(cli.export_json, Some(PathBuf::from("out.json")));
        assert!(cli.plot);
        assert_eq!(cli.width, 60);
    }

    #[test]
    fn csv_path_is_required() {
        assert!(Cli::try_parse_from(["proxi"]).is_err());
    }
}
