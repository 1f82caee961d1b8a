//! Per-minute response latency from the bot's `updates.log`.
//!
//! Each line reads `<receivedAt>s — <updateId> — <age>s`. Lines that do not
//! fit are counted and skipped.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use chrono::{DateTime, Utc};

use crate::error::{StatsError, StatsResult};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const LOG_SEPARATOR: &str = " — ";
const LOOKBACK_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySample {
    /// Unix seconds.
    pub received_at: i64,
    pub age_secs: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseTimeReport {
    /// Minute-aligned Unix seconds to mean age.
    pub averages: BTreeMap<i64, f64>,
    /// Non-empty lines read.
    pub lines: usize,
    /// Samples inside the lookback window.
    pub samples: usize,
    pub malformed: usize,
}

pub fn read_response_times(path: &Path, now: DateTime<Utc>) -> StatsResult<ResponseTimeReport> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(StatsError::not_found(format!(
                "response log {}",
                path.display()
            )))
        }
        Err(source) => {
            return Err(StatsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_response_times(BufReader::new(file), now).map_err(|source| StatsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Only samples received in the 24 hours before `now` are kept. Invalid
/// UTF-8 is replaced rather than treated as a read error.
pub fn parse_response_times<R: BufRead>(
    mut reader: R,
    now: DateTime<Utc>,
) -> io::Result<ResponseTimeReport> {
    let cutoff = now.timestamp() - LOOKBACK_SECS;
    let mut totals: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    let mut report = ResponseTimeReport::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let raw = String::from_utf8_lossy(&buf);
        let line = raw.trim_end_matches(|c| c == '\r' || c == '\n');
        if line.trim().is_empty() {
            continue;
        }
        report.lines += 1;

        match parse_line(line) {
            Ok(sample) if sample.received_at > cutoff => {
                let minute = sample.received_at - sample.received_at.rem_euclid(60);
                let entry = totals.entry(minute).or_insert((0.0, 0));
                entry.0 += sample.age_secs;
                entry.1 += 1;
                report.samples += 1;
            }
            Ok(_) => {}
            Err(err) => {
                report.malformed += 1;
                log_debug!("skipping response log line {}: {err}", report.lines);
            }
        }
    }

    report.averages = totals
        .into_iter()
        .map(|(minute, (sum, count))| (minute, sum / count as f64))
        .collect();

    Ok(report)
}

pub fn parse_line(line: &str) -> StatsResult<LatencySample> {
    let fields: Vec<&str> = line.split(LOG_SEPARATOR).collect();
    if fields.len() < 3 {
        return Err(StatsError::malformed(format!(
            "expected 3 fields, found {}",
            fields.len()
        )));
    }

    let received_at = parse_seconds(fields[0])
        .ok_or_else(|| StatsError::malformed(format!("bad timestamp '{}'", fields[0])))?;
    let age_secs = parse_seconds(fields[2])
        .ok_or_else(|| StatsError::malformed(format!("bad age '{}'", fields[2])))?;

    Ok(LatencySample {
        received_at: received_at.trunc() as i64,
        age_secs,
    })
}

/// A number with an optional trailing `s` unit.
fn parse_seconds(field: &str) -> Option<f64> {
    let value = field.trim();
    let value = value.strip_suffix('s').unwrap_or(value);
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Cursor;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn line(received_at: i64, age: &str) -> String {
        format!("{received_at}s — 12345 — {age}s\n")
    }

    #[test]
    fn averages_samples_within_a_minute() {
        let minute = 1_699_999_980;
        let input = [
            line(minute, "1.0"),
            line(minute + 10, "2.0"),
            line(minute + 19, "3.0"),
        ]
        .concat();

        let report = parse_response_times(Cursor::new(input), now()).unwrap();
        assert_eq!(report.averages.len(), 1);
        assert_eq!(report.averages[&minute], 2.0);
        assert_eq!(report.samples, 3);
    }

    #[test]
    fn malformed_lines_are_counted_not_fatal() {
        let input = [
            line(1_699_999_000, "0.5"),
            "1699999001s — only two fields\n".to_string(),
            "1699999002s — 1 — fasts\n".to_string(),
            "garbage\n".to_string(),
            "\n".to_string(),
            line(1_699_999_100, "1.5"),
        ]
        .concat();

        let report = parse_response_times(Cursor::new(input), now()).unwrap();
        assert_eq!(report.samples, 2);
        assert_eq!(report.malformed, 3);
        assert_eq!(report.lines, 5);
    }

    #[test]
    fn samples_older_than_a_day_are_dropped() {
        let stale = 1_700_000_000 - LOOKBACK_SECS;
        let input = [line(stale, "9.0"), line(stale + 60, "4.0")].concat();

        let report = parse_response_times(Cursor::new(input), now()).unwrap();
        assert_eq!(report.samples, 1);
        assert!(!report.averages.values().any(|avg| *avg == 9.0));
        assert_eq!(report.malformed, 0);
    }

    #[test]
    fn keys_are_minute_aligned() {
        let input = line(1_699_999_999, "0.25");
        let report = parse_response_times(Cursor::new(input), now()).unwrap();
        assert_eq!(report.averages.keys().copied().collect::<Vec<_>>(), vec![1_699_999_980]);
    }

    #[test]
    fn handles_crlf_and_invalid_utf8() {
        let mut input = b"1699999900s \xE2\x80\x94 1 \xE2\x80\x94 2.0s\r\n".to_vec();
        input.extend_from_slice(b"\xFF\xFE broken\n");

        let report = parse_response_times(Cursor::new(input), now()).unwrap();
        assert_eq!(report.samples, 1);
        assert_eq!(report.malformed, 1);
    }

    #[test]
    fn unit_suffix_is_optional() {
        let sample = parse_line("1699999900 — x — 0.75").unwrap();
        assert_eq!(sample, LatencySample { received_at: 1_699_999_900, age_secs: 0.75 });
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_response_times(&dir.path().join("updates.log"), now()).unwrap_err();
        assert!(err.is_not_found());
    }
}
