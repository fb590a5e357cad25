//! Reading (timestamp, value) observations from CSV

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::path::Path;
use tracing::{debug, warn};

use crate::CliResult;

/// Layouts tried after integer epoch seconds and RFC 3339
const DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Epoch seconds for any of the accepted timestamp layouts
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(seconds) = raw.parse::<i64>() {
        return Some(seconds);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp());
    }
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(raw, format)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive).timestamp())
    })
}

/// RFC 3339 rendering of epoch seconds
pub fn format_timestamp(seconds: i64) -> String {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| seconds.to_string())
}

/// Observations in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observations {
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
}

impl Observations {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<i64> {
        self.timestamps.iter().copied().max()
    }
}

/// Read a two-column CSV, skipping rows that do not parse.
///
/// An unparsable first row is taken as the header. Fails only when the
/// file cannot be read or no row parses.
pub fn load_csv(path: &Path) -> CliResult<Observations> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;

    let mut observations = Observations::default();
    let mut skipped = 0usize;
    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 1, error = %e, "unreadable row skipped");
                skipped += 1;
                continue;
            }
        };
        let parsed = match (record.get(0), record.get(1)) {
            (Some(ts), Some(v)) => parse_timestamp(ts).zip(v.parse::<f64>().ok()),
            _ => None,
        };
        match parsed {
            Some((ts, v)) => {
                observations.timestamps.push(ts);
                observations.values.push(v);
            }
            None if line == 0 => debug!("first row treated as header"),
            None => {
                warn!(line = line + 1, "row skipped, expected <timestamp>,<value>");
                skipped += 1;
            }
        }
    }

    if observations.is_empty() {
        return Err(format!("No parsable rows in {}", path.display()));
    }
    debug!(rows = observations.len(), skipped, "observations loaded");
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_timestamp_layouts() {
        let expected = 1_700_000_000 - 1_700_000_000 % 60;
        assert_eq!(parse_timestamp("1700000000"), Some(1_700_000_000));
        assert_eq!(parse_timestamp("2023-11-14T22:13:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-11-14T23:13:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-11-14 22:13:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-11-14 22:13"), Some(expected));
        assert_eq!(parse_timestamp("14/11/2023 22:13"), Some(expected));
        assert_eq!(parse_timestamp("11/14/2023 22:13"), Some(expected));
        assert_eq!(parse_timestamp("2023-11-14T22:13:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_load_skips_bad_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time,value").unwrap();
        writeln!(file, "2024-01-01 00:00,10.5").unwrap();
        writeln!(file, "garbage,1").unwrap();
        writeln!(file, "2024-01-01 00:30,").unwrap();
        writeln!(file, "1704069000,12").unwrap();
        file.flush().unwrap();

        let observations = load_csv(file.path()).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations.values, vec![10.5, 12.0]);
        assert_eq!(observations.timestamps[0], 1_704_067_200);
        assert_eq!(observations.last_timestamp(), Some(1_704_069_000));
    }

    #[test]
    fn test_load_fails_without_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time,value").unwrap();
        writeln!(file, "x,y").unwrap();
        file.flush().unwrap();
        assert!(load_csv(file.path()).is_err());
    }
}
