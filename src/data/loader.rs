//! Dataset fetch + CSV parsing.
//!
//! The loader turns the district CSV into `DistrictRecord`s keyed by the
//! header row. It runs on a background thread so the UI keeps handling input
//! while the fetch is in flight; the thread reports exactly one
//! `LoadOutcome` over a channel.

use std::fs::File;
use std::io::Read;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use csv::{ByteRecord, StringRecord};
use reqwest::blocking::Client;

use crate::data::{DataSource, DatasetConfig};
use crate::domain::DistrictRecord;
use crate::error::AppError;

/// Terminal result of a dataset load.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Vec<DistrictRecord>),
    Failed(AppError),
}

/// Receiving end of a background load.
pub struct LoadHandle {
    rx: Option<Receiver<LoadOutcome>>,
}

impl LoadHandle {
    pub(crate) fn from_receiver(rx: Receiver<LoadOutcome>) -> Self {
        Self { rx: Some(rx) }
    }

    fn finished(outcome: LoadOutcome) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(outcome);
        Self::from_receiver(rx)
    }

    /// `true` until the outcome has been taken.
    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }

    /// Non-blocking check for the outcome.
    ///
    /// Returns `Some` exactly once; afterwards the handle is spent.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        let rx = self.rx.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => LoadOutcome::Failed(AppError::data_load(
                "Dataset loader exited without reporting a result.",
            )),
        };
        self.rx = None;
        Some(outcome)
    }
}

/// Start loading the dataset on a background thread.
pub fn spawn_load(config: DatasetConfig) -> LoadHandle {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("dataset-loader".to_string())
        .spawn(move || {
            let outcome = match load_records(&config) {
                Ok(records) => LoadOutcome::Loaded(records),
                Err(err) => LoadOutcome::Failed(err),
            };
            // The receiver may already be gone if the UI quit mid-load.
            let _ = tx.send(outcome);
        });

    match spawned {
        Ok(_) => LoadHandle::from_receiver(rx),
        Err(e) => LoadHandle::finished(LoadOutcome::Failed(AppError::data_load(format!(
            "Failed to start dataset loader: {e}"
        )))),
    }
}

/// Fetch and parse the dataset (blocking).
pub fn load_records(config: &DatasetConfig) -> Result<Vec<DistrictRecord>, AppError> {
    tracing::info!(source = %config.source, "loading dataset");
    let records = match &config.source {
        DataSource::Path(path) => {
            let file = File::open(path).map_err(|e| {
                AppError::data_load(format!("Failed to open dataset '{}': {e}", path.display()))
            })?;
            parse_records(file, &config.name_column)?
        }
        DataSource::Url(url) => {
            let body = fetch_url(url)?;
            parse_records(body.as_bytes(), &config.name_column)?
        }
    };
    tracing::info!("Data loaded: {} records", records.len());
    Ok(records)
}

fn fetch_url(url: &str) -> Result<String, AppError> {
    let resp = Client::new()
        .get(url)
        .send()
        .map_err(|e| AppError::data_load(format!("Dataset request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::data_load(format!(
            "Dataset request failed with status {}.",
            resp.status()
        )));
    }

    resp.text()
        .map_err(|e| AppError::data_load(format!("Failed to read dataset response: {e}")))
}

/// Parse CSV text into records, using the header row for field names.
///
/// Blank rows are skipped. Rows shorter than the header get `None` for the
/// missing fields; fields past the header width are dropped. Bytes that are
/// not valid UTF-8 are replaced with U+FFFD rather than failing the load.
pub fn parse_records<R: Read>(reader: R, name_column: &str) -> Result<Vec<DistrictRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .byte_headers()
        .map(lossy)
        .map_err(|e| AppError::data_load(format!("Failed to read CSV headers: {e}")))?;

    let name_idx = headers.iter().position(|h| h == name_column);
    if name_idx.is_none() {
        tracing::warn!(column = name_column, "name column missing from dataset header");
    }

    let mut records = Vec::new();
    for (idx, result) in reader.byte_records().enumerate() {
        // +2: byte_records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        let record = result
            .map(|r| lossy(&r))
            .map_err(|e| AppError::data_load(format!("CSV parse error on line {line}: {e}")))?;

        if is_blank(&record) {
            continue;
        }
        if record.len() > headers.len() {
            tracing::debug!(line, extra = record.len() - headers.len(), "ignoring extra fields");
        }

        records.push(build_record(&headers, &record, name_idx));
    }

    Ok(records)
}

fn lossy(record: &ByteRecord) -> StringRecord {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect::<Vec<_>>()
        .into()
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.is_empty())
}

fn build_record(headers: &StringRecord, record: &StringRecord, name_idx: Option<usize>) -> DistrictRecord {
    let name = name_idx
        .and_then(|i| record.get(i))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let fields = headers
        .iter()
        .enumerate()
        .filter(|&(i, key)| Some(i) != name_idx && !key.is_empty())
        .map(|(i, key)| (key.to_string(), record.get(i).map(str::to_string)))
        .collect();

    DistrictRecord::new(name, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = "clean_name,20192020,20202021\n\
                          Lincoln Unified,12.5,NA\n\
                          \n\
                          Lincoln East,8.1,9.0\n";

    #[test]
    fn parses_header_keys_and_skips_blank_rows() {
        let records = parse_records(SAMPLE.as_bytes(), "clean_name").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Lincoln Unified"));
        assert_eq!(
            records[0].fields,
            vec![
                ("20192020".to_string(), Some("12.5".to_string())),
                ("20202021".to_string(), Some("NA".to_string())),
            ]
        );
        assert_eq!(records[1].name.as_deref(), Some("Lincoln East"));
    }

    #[test]
    fn short_rows_leave_fields_missing() {
        let csv = "clean_name,20192020,20202021\nShort District,4.0\n";
        let records = parse_records(csv.as_bytes(), "clean_name").unwrap();
        assert_eq!(records[0].fields[1], ("20202021".to_string(), None));
    }

    #[test]
    fn all_empty_fields_count_as_blank() {
        let csv = "clean_name,20192020\n , \nReal,1.0\n";
        let records = parse_records(csv.as_bytes(), "clean_name").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name(), "Real");
    }

    #[test]
    fn blank_name_becomes_none() {
        let csv = "clean_name,20192020\n,3.0\n";
        let records = parse_records(csv.as_bytes(), "clean_name").unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].name.is_none());
    }

    #[test]
    fn latin1_bytes_do_not_fail_the_load() {
        let csv: &[u8] = b"clean_name,20192020\nSan Jos\xe9 Unified,5.0\nOakland Unified,7.5\n";
        let records = parse_records(csv, "clean_name").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].display_name(), "San Jos\u{fffd} Unified");
        assert_eq!(records[0].fields[0], ("20192020".to_string(), Some("5.0".to_string())));
        assert_eq!(records[1].display_name(), "Oakland Unified");
    }

    #[test]
    fn missing_file_is_a_data_load_failure() {
        let config = DatasetConfig {
            source: DataSource::Path(PathBuf::from("definitely/not/here.csv")),
            name_column: "clean_name".to_string(),
        };
        let err = load_records(&config).unwrap_err();
        assert!(err.is_data_load());
    }

    #[test]
    fn background_load_reports_exactly_once() {
        let config = DatasetConfig {
            source: DataSource::Path(PathBuf::from("definitely/not/here.csv")),
            name_column: "clean_name".to_string(),
        };
        let mut handle = spawn_load(config);

        let outcome = loop {
            if let Some(outcome) = handle.poll() {
                break outcome;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(matches!(outcome, LoadOutcome::Failed(ref e) if e.is_data_load()));
        assert!(!handle.is_pending());
        assert!(handle.poll().is_none());
    }

    #[test]
    fn dropped_sender_is_reported_as_failure() {
        let (tx, rx) = mpsc::channel::<LoadOutcome>();
        drop(tx);
        let mut handle = LoadHandle::from_receiver(rx);
        assert!(matches!(handle.poll(), Some(LoadOutcome::Failed(_))));
        assert!(handle.poll().is_none());
    }
}
