//! CSV ingest and normalization.
//!
//! This module turns a device log export into typed `ContactRecord`s.
//!
//! Design goals:
//! - **Order-independent schema**: columns are found by name, unknown columns ignored
//! - **Row-level validation**: bad cells become missing values, bad rows are
//!   dropped and reported, never fatal
//! - **Separation of concerns**: no derived metrics or statistics here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use crate::domain::{ContactRecord, Field};
use crate::error::AppError;

/// Which recognised columns the input file provides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    /// Recognised numeric columns, in `Field::RAW` order.
    pub numeric: Vec<Field>,
    pub exposure_status: bool,
    /// Total number of header columns (recognised or not).
    pub total: usize,
}

impl Columns {
    pub fn has(&self, field: Field) -> bool {
        self.numeric.contains(&field)
    }
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: typed records plus bookkeeping for the data-quality section.
#[derive(Debug, Clone)]
pub struct IngestedData {
    /// File name of the source (for the report header).
    pub source_name: String,
    pub records: Vec<ContactRecord>,
    pub columns: Columns,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_dropped: usize,
    /// Cells in the kept rows (`records × header columns`).
    pub total_cells: usize,
    /// Cells in the kept rows that were empty or failed numeric coercion.
    pub missing_cells: usize,
}

/// Load a device log CSV from disk.
pub fn load_records(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::unreadable(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let data = load_records_from_reader(file, source_name)?;
    info!(
        "Loaded {} rows ({} dropped) with {} columns from {}",
        data.records.len(),
        data.rows_dropped,
        data.columns.total,
        path.display()
    );
    Ok(data)
}

/// Load a device log CSV from any reader.
pub fn load_records_from_reader<R: Read>(input: R, source_name: impl Into<String>) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::unreadable(format!("Failed to read CSV headers: {e}")))?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::unreadable("CSV has no header row."));
    }

    let header_map = build_header_map(&headers);
    let layout = ColumnLayout::resolve(&header_map);
    let columns = layout.columns(headers.len());

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;
    let mut missing_cells = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, which is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("line {line}: dropped, CSV parse error: {e}");
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                rows_dropped += 1;
                continue;
            }
        };

        match parse_row(&record, &layout, line) {
            Ok((row, warnings)) => {
                missing_cells += count_missing_cells(&record, &layout, headers.len());
                row_errors.extend(warnings);
                records.push(row);
            }
            Err(message) => {
                debug!("line {line}: dropped, {message}");
                row_errors.push(RowError { line, message });
                rows_dropped += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::no_data(
            "No valid rows remain after loading (every row was empty or malformed).",
        ));
    }

    let total_cells = records.len() * headers.len();

    Ok(IngestedData {
        source_name: source_name.into(),
        records,
        columns,
        row_errors,
        rows_read,
        rows_dropped,
        total_cells,
        missing_cells,
    })
}

/// Column indices of every recognised field.
#[derive(Debug, Clone, Default)]
struct ColumnLayout {
    timestamp: Option<usize>,
    peer_id: Option<usize>,
    device_id: Option<usize>,
    rssi: Option<usize>,
    upload_duration: Option<usize>,
    contact_duration: Option<usize>,
    close_contact_duration: Option<usize>,
    distance: Option<usize>,
    exposure_status: Option<usize>,
}

impl ColumnLayout {
    fn resolve(header_map: &HashMap<String, usize>) -> Self {
        let find = |names: &[&str]| names.iter().find_map(|n| header_map.get(*n).copied());
        Self {
            timestamp: find(&["timestamp"]),
            peer_id: find(&["peerid"]),
            device_id: find(&["deviceid"]),
            rssi: find(&["rssi"]),
            upload_duration: find(&["uploadduration"]),
            contact_duration: find(&["contactduration"]),
            close_contact_duration: find(&["closecontactduration"]),
            distance: find(&["distanceinmeter", "distance", "distancem"]),
            exposure_status: find(&["exposurestatus"]),
        }
    }

    fn numeric_index(&self, field: Field) -> Option<usize> {
        match field {
            Field::Timestamp => self.timestamp,
            Field::Rssi => self.rssi,
            Field::UploadDuration => self.upload_duration,
            Field::ContactDuration => self.contact_duration,
            Field::CloseContactDuration => self.close_contact_duration,
            Field::Distance => self.distance,
            _ => None,
        }
    }

    fn columns(&self, total: usize) -> Columns {
        Columns {
            numeric: Field::RAW
                .iter()
                .copied()
                .filter(|f| self.numeric_index(*f).is_some())
                .collect(),
            exposure_status: self.exposure_status.is_some(),
            total,
        }
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_row(record: &StringRecord, layout: &ColumnLayout, line: usize) -> Result<(ContactRecord, Vec<RowError>), String> {
    let mut warnings = Vec::new();

    // A non-numeric timestamp usually means a repeated header row; drop it.
    let timestamp = match layout.timestamp {
        Some(idx) => {
            let raw = get_cell(record, idx);
            match parse_opt_f64(raw) {
                Some(ts) => Some(ts),
                None => {
                    return Err(format!(
                        "non-numeric timestamp '{}'",
                        raw.unwrap_or_default()
                    ));
                }
            }
        }
        None => None,
    };

    let mut distance = layout.distance.and_then(|idx| parse_opt_f64(get_cell(record, idx)));
    if let Some(d) = distance {
        if d < 0.0 {
            warnings.push(RowError {
                line,
                message: format!("negative distance {d} treated as missing"),
            });
            distance = None;
        }
    }

    let text = |idx: Option<usize>| idx.and_then(|i| get_cell(record, i)).map(str::to_string);
    let number = |idx: Option<usize>| idx.and_then(|i| parse_opt_f64(get_cell(record, i)));

    Ok((
        ContactRecord {
            line,
            timestamp,
            peer_id: text(layout.peer_id),
            device_id: text(layout.device_id),
            rssi: number(layout.rssi),
            upload_duration: number(layout.upload_duration),
            contact_duration: number(layout.contact_duration),
            close_contact_duration: number(layout.close_contact_duration),
            distance,
            exposure_status: text(layout.exposure_status),
        },
        warnings,
    ))
}

fn count_missing_cells(record: &StringRecord, layout: &ColumnLayout, width: usize) -> usize {
    let numeric: Vec<usize> = Field::RAW
        .iter()
        .filter_map(|f| layout.numeric_index(*f))
        .collect();

    (0..width)
        .filter(|&idx| {
            let cell = get_cell(record, idx);
            if numeric.contains(&idx) {
                parse_opt_f64(cell).is_none()
            } else {
                cell.is_none()
            }
        })
        .count()
}

fn get_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "timeStamp,peerId,rssi,deviceId,uploadDuration,contactDuration,closeContactDuration,exposureStatus,distanceInMeter";

    fn load(body: &str) -> Result<IngestedData, AppError> {
        load_records_from_reader(body.as_bytes(), "test.csv")
    }

    #[test]
    fn parses_firmware_schema() {
        let csv = format!(
            "{HEADER}\n1700000000,aa:bb,-61,ESP32_B,120,300,60,NORMAL,1.5\n1700000060,cc:dd,-72,ESP32_B,95,30,0,EXPOSURE,3.2\n"
        );
        let data = load(&csv).unwrap();
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.rows_read, 2);
        assert_eq!(data.rows_dropped, 0);
        assert_eq!(data.columns.numeric, Field::RAW.to_vec());
        assert!(data.columns.exposure_status);
        assert_eq!(data.columns.total, 9);

        let r = &data.records[1];
        assert_eq!(r.line, 3);
        assert_eq!(r.timestamp, Some(1_700_000_060.0));
        assert_eq!(r.rssi, Some(-72.0));
        assert_eq!(r.distance, Some(3.2));
        assert_eq!(r.peer_id.as_deref(), Some("cc:dd"));
        assert_eq!(r.exposure_status.as_deref(), Some("EXPOSURE"));
        assert_eq!(data.missing_cells, 0);
        assert_eq!(data.total_cells, 18);
    }

    #[test]
    fn columns_are_order_independent_and_extra_columns_ignored() {
        let csv = "firmware,distance_in_meter,RSSI,timestamp\nv1,2.0,-50,1\nv1,4.0,-66,2\n";
        let data = load(csv).unwrap();
        assert_eq!(data.columns.numeric, vec![Field::Timestamp, Field::Rssi, Field::Distance]);
        assert!(!data.columns.exposure_status);
        assert_eq!(data.records[0].distance, Some(2.0));
        assert_eq!(data.records[1].rssi, Some(-66.0));
        assert_eq!(data.records[1].contact_duration, None);
    }

    #[test]
    fn repeated_header_rows_are_dropped() {
        let csv = format!("{HEADER}\n1,a,-50,d,1,2,1,NORMAL,0.5\n{HEADER}\n2,a,-60,d,1,2,1,NORMAL,1.5\n");
        let data = load(&csv).unwrap();
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_dropped, 1);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 3);
    }

    #[test]
    fn bad_cells_become_missing() {
        let csv = format!("{HEADER}\n1,a,weak,d,,2,1,,abc\n");
        let data = load(&csv).unwrap();
        let r = &data.records[0];
        assert_eq!(r.rssi, None);
        assert_eq!(r.upload_duration, None);
        assert_eq!(r.distance, None);
        assert_eq!(r.exposure_status, None);
        // rssi, uploadDuration, exposureStatus, distanceInMeter.
        assert_eq!(data.missing_cells, 4);
    }

    #[test]
    fn negative_distance_is_missing_but_row_kept() {
        let csv = format!("{HEADER}\n1,a,-50,d,1,2,1,NORMAL,-3\n");
        let data = load(&csv).unwrap();
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].distance, None);
        assert_eq!(data.row_errors.len(), 1);
    }

    #[test]
    fn bom_prefixed_header_is_recognised() {
        let csv = "\u{feff}timeStamp,rssi\n1,-40\n";
        let data = load(csv).unwrap();
        assert!(data.columns.has(Field::Timestamp));
        assert_eq!(data.records[0].timestamp, Some(1.0));
    }

    #[test]
    fn no_usable_rows_is_fatal() {
        let err = load(&format!("{HEADER}\n")).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let err = load("timeStamp,rssi\nnot-a-time,-40\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
