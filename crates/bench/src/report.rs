// Copyright (C) 2024-present The Routebench Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON time series report of the benchmark run.

use chrono::{DateTime, Utc};
use std::{fs::File, io::BufWriter, path::Path};

/// One benchmark tick: running totals of prefixes the local speaker has
/// advertised and received so far.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportEntry {
    pub time: String,
    pub advertised: u64,
    pub received: u64,
}

impl ReportEntry {
    pub fn new(at: DateTime<Utc>, advertised: u64, received: u64) -> Self {
        Self {
            time: at.format("%H:%M:%S").to_string(),
            advertised,
            received,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to create report file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Write the report as a JSON array.
pub fn write_report(path: &Path, entries: &[ReportEntry]) -> Result<(), ReportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), entries)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_time_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 17, 9, 4, 33).unwrap();
        let entry = ReportEntry::new(at, 10, 20);
        assert_eq!(entry.time, "09:04:33");
    }

    #[test]
    fn test_write_report_round_trip() {
        let path = std::env::temp_dir().join(format!("routebench-report-{}.json", std::process::id()));
        let entries = vec![
            ReportEntry {
                time: "09:04:33".to_string(),
                advertised: 100,
                received: 0,
            },
            ReportEntry {
                time: "09:04:34".to_string(),
                advertised: 100,
                received: 250,
            },
        ];
        write_report(&path, &entries).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ReportEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, entries);
        std::fs::remove_file(&path).unwrap();
    }
}
