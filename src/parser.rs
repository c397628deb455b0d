// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reading of tester logs.
//!
//! A tester log interleaves progress output with summary lines of the form
//!
//! ```text
//! > <test> <family> <status> <input size> <threads> <retries> <ms> <ops/s> ...
//! ```
//!
//! Only marker-prefixed lines with at least eight fields are candidates.
//! Anything else is noise and is skipped silently, while a candidate whose
//! numeric fields do not parse is a [`ParseError::MalformedRecord`] and ends
//! the file.

use crate::error::ParseError;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// Character opening every summary line.
pub const LOG_MARKER: char = '>';

const LOG_MARKER_BYTE: u8 = LOG_MARKER as u8;

/// Number of positional fields following the marker.
pub const MIN_FIELDS: usize = 8;

/// Status written by the harness for a run whose results checked out.
pub const STATUS_OK: &str = "OK";

/// One summary line of a tester log.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
  pub test_name: String,
  /// Family the log file belongs to.
  pub config_family: String,
  /// Family as written on the line; kept but never cross-checked.
  pub logged_family: String,
  pub status: String,
  pub input_size: f64,
  /// Integers are kept signed as logged; range checks belong to the filter.
  pub thread_count: i64,
  pub retry_count: i64,
  /// Mean run time in milliseconds.
  pub elapsed_time: f64,
  pub throughput_ops: i64,
}

/// Validity predicates a record must pass to be plotted.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFilter {
  pub min_input_size: f64,
  pub baseline_family: String,
  pub thread_counts: Vec<u32>,
}

impl RecordFilter {
  pub fn accepts(&self, record: &RawRecord) -> bool {
    record.status == STATUS_OK
      && record.input_size >= self.min_input_size
      && record.config_family != self.baseline_family
      && self
        .thread_counts
        .iter()
        .any(|&t| i64::from(t) == record.thread_count)
  }
}

/// Numeric field that failed to parse on a candidate line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field: &'static str,
  pub value: String,
}

fn field<T: FromStr>(name: &'static str, raw: &str) -> Result<T, FieldError> {
  raw.parse().map_err(|_| FieldError {
    field: name,
    value: raw.to_string(),
  })
}

/// Parses one log line on behalf of `family`.
///
/// Returns `Ok(None)` for non-candidate lines and for candidates whose status
/// is not `OK`; the status gate runs before numeric coercion, so failed runs
/// never raise.
pub fn parse_line(line: &str, family: &str) -> Result<Option<RawRecord>, FieldError> {
  let Some(rest) = line.strip_prefix(LOG_MARKER) else {
    return Ok(None);
  };

  let fields: Vec<&str> = rest.split_whitespace().collect();
  if fields.len() < MIN_FIELDS {
    return Ok(None);
  }

  if fields[2] != STATUS_OK {
    return Ok(None);
  }

  Ok(Some(RawRecord {
    test_name: fields[0].to_string(),
    config_family: family.to_string(),
    logged_family: fields[1].to_string(),
    status: fields[2].to_string(),
    input_size: field("input size", fields[3])?,
    thread_count: field("thread count", fields[4])?,
    retry_count: field("retry count", fields[5])?,
    elapsed_time: field("elapsed time", fields[6])?,
    throughput_ops: field("throughput", fields[7])?,
  }))
}

/// Locates and opens the log of each configuration family.
#[derive(Debug, Clone)]
pub struct LogParser {
  data_dir: PathBuf,
  filter: RecordFilter,
}

impl LogParser {
  pub fn new(data_dir: impl Into<PathBuf>, filter: RecordFilter) -> Self {
    Self {
      data_dir: data_dir.into(),
      filter,
    }
  }

  /// `<data_dir>/tester-<family>.txt`
  pub fn log_path(&self, family: &str) -> PathBuf {
    self.data_dir.join(format!("tester-{family}.txt"))
  }

  /// Opens the family's log and returns its validated records.
  ///
  /// Every call reads the file again from the start.
  pub fn records(&self, family: &str) -> Result<Records<'_, BufReader<File>>, ParseError> {
    let path = self.log_path(family);
    if !path.exists() {
      return Err(ParseError::FileNotFound {
        family: family.to_string(),
        path,
      });
    }

    let file = File::open(&path).map_err(|source| ParseError::Open {
      path: path.clone(),
      source,
    })?;

    tracing::debug!(path = %path.display(), "Opened tester log");

    Ok(Records::new(BufReader::new(file), path, family, &self.filter))
  }
}

/// Lazy, finite sequence of validated records from one log.
///
/// Yields at most one error, after which it is exhausted.
pub struct Records<'a, R> {
  reader: R,
  buf: Vec<u8>,
  path: PathBuf,
  family: String,
  filter: &'a RecordFilter,
  line_no: usize,
  done: bool,
}

impl<'a, R: BufRead> Records<'a, R> {
  pub fn new(reader: R, path: impl AsRef<Path>, family: &str, filter: &'a RecordFilter) -> Self {
    Self {
      reader,
      buf: Vec::new(),
      path: path.as_ref().to_path_buf(),
      family: family.to_string(),
      filter,
      line_no: 0,
      done: false,
    }
  }

  fn fail(&mut self, err: ParseError) -> Option<Result<RawRecord, ParseError>> {
    self.done = true;
    Some(Err(err))
  }
}

impl<R: BufRead> Iterator for Records<'_, R> {
  type Item = Result<RawRecord, ParseError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }

    loop {
      self.buf.clear();
      match self.reader.read_until(b'\n', &mut self.buf) {
        Ok(0) => return None,
        Ok(_) => {}
        Err(source) => {
          let path = self.path.clone();
          return self.fail(ParseError::Read { path, source });
        }
      }
      self.line_no += 1;

      // Progress output may carry any bytes; only summary lines are decoded.
      if self.buf.first() != Some(&LOG_MARKER_BYTE) {
        continue;
      }
      let parsed = parse_line(&String::from_utf8_lossy(&self.buf), &self.family);

      match parsed {
        Ok(Some(record)) if self.filter.accepts(&record) => return Some(Ok(record)),
        Ok(Some(record)) => {
          tracing::trace!(test = %record.test_name, line = self.line_no, "Filtered out record");
        }
        Ok(None) => {}
        Err(FieldError { field, value }) => {
          let err = ParseError::MalformedRecord {
            path: self.path.clone(),
            line_no: self.line_no,
            field,
            value,
          };
          return self.fail(err);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  fn filter() -> RecordFilter {
    RecordFilter {
      min_input_size: 10000.0,
      baseline_family: "onethread".to_string(),
      thread_counts: vec![2, 4, 8, 16],
    }
  }

  fn collect(log: &str, family: &str) -> Result<Vec<RawRecord>, ParseError> {
    let filter = filter();
    Records::new(Cursor::new(log), "tester.txt", family, &filter).collect()
  }

  #[test]
  fn parses_summary_line() {
    let record = parse_line("> BankTest mutex OK 20000 4 3 12.345 1621 extra", "mutex")
      .unwrap()
      .unwrap();

    assert_eq!(
      record,
      RawRecord {
        test_name: "BankTest".to_string(),
        config_family: "mutex".to_string(),
        logged_family: "mutex".to_string(),
        status: "OK".to_string(),
        input_size: 20000.0,
        thread_count: 4,
        retry_count: 3,
        elapsed_time: 12.345,
        throughput_ops: 1621,
      }
    );
  }

  #[test]
  fn ignores_progress_and_short_lines() {
    let log = "\
Wating for configuration data from stdin...
Test: BankTest
Threads count: 4
\tRun...             OK 12.000 ms, 1667 ops/s

> BankTest fail
> BankTest mutex OK 20000 4 3
";
    assert!(collect(log, "mutex").unwrap().is_empty());
  }

  #[test]
  fn non_ok_status_never_raises() {
    let line = "> BankTest mutex FAIL not a number at all x";
    assert_eq!(parse_line(line, "mutex"), Ok(None));
  }

  #[test]
  fn record_family_comes_from_file_not_line() {
    let records = collect("> BankTest tm 1 OK 20000 2 1 5.0 4000", "tm-tiny");
    // "tm 1" shifts the fields, so the status slot reads "1".
    assert!(records.unwrap().is_empty());

    let records = collect("> BankTest tm OK 20000 2 1 5.0 4000", "tm-tiny").unwrap();
    assert_eq!(records[0].config_family, "tm-tiny");
    assert_eq!(records[0].logged_family, "tm");
  }

  #[test]
  fn validity_filter_drops_records() {
    let log = "\
> Small mutex OK 9999 4 1 1.0 100
> Odd mutex OK 20000 3 1 1.0 100
> Many mutex OK 20000 32 1 1.0 100
> Keep mutex OK 10000 16 1 1.0 100
";
    let names: Vec<String> = collect(log, "mutex")
      .unwrap()
      .into_iter()
      .map(|r| r.test_name)
      .collect();
    assert_eq!(names, vec!["Keep"]);
  }

  #[test]
  fn non_utf8_progress_line_is_noise() {
    let mut log = b"Test: Bank\xe9Test progress\n".to_vec();
    log.extend_from_slice(b"> BankTest mutex OK 20000 4 1 1.0 100\n");
    let filter = filter();

    let records: Vec<_> = Records::new(Cursor::new(log), "tester-mutex.txt", "mutex", &filter)
      .collect::<Result<_, _>>()
      .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].test_name, "BankTest");
  }

  #[test]
  fn non_utf8_test_name_is_decoded_lossily() {
    let log = b"> Bank\xe9 mutex OK 20000 4 1 1.0 100\n".to_vec();
    let filter = filter();

    let records: Vec<RawRecord> =
      Records::new(Cursor::new(log), "tester-mutex.txt", "mutex", &filter)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(records[0].test_name, "Bank\u{FFFD}");
  }

  #[test]
  fn negative_thread_count_is_filtered_not_malformed() {
    let record = parse_line("> T mutex OK 20000 -1 1 1.0 100", "mutex")
      .unwrap()
      .unwrap();
    assert_eq!(record.thread_count, -1);
    assert!(!filter().accepts(&record));

    let log = "\
> T mutex OK 20000 -1 1 1.0 100
> T mutex OK 20000 4 1 1.0 100
";
    let records = collect(log, "mutex").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].thread_count, 4);
  }

  #[test]
  fn baseline_family_is_always_excluded() {
    let log = "> BankTest onethread OK 50000 2 1 1.0 100\n";
    assert!(collect(log, "onethread").unwrap().is_empty());
  }

  #[test]
  fn malformed_number_ends_the_file() {
    let log = "\
> A mutex OK 20000 4 1 1.0 100
> B mutex OK 20000 four 1 1.0 100
> C mutex OK 20000 4 1 1.0 100
";
    let filter = filter();
    let mut records = Records::new(Cursor::new(log), "tester-mutex.txt", "mutex", &filter);

    assert_eq!(records.next().unwrap().unwrap().test_name, "A");
    match records.next() {
      Some(Err(ParseError::MalformedRecord {
        line_no,
        field,
        value,
        ..
      })) => {
        assert_eq!(line_no, 2);
        assert_eq!(field, "thread count");
        assert_eq!(value, "four");
      }
      other => panic!("expected malformed record, got {other:?}"),
    }
    assert!(records.next().is_none());
  }

  #[test]
  fn missing_log_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let parser = LogParser::new(dir.path(), filter());

    assert!(matches!(
      parser.records("mutex"),
      Err(ParseError::FileNotFound { family, .. }) if family == "mutex"
    ));
  }

  #[test]
  fn each_call_rereads_the_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
      dir.path().join("tester-mutex.txt"),
      "> BankTest mutex OK 20000 4 1 1.0 100\n",
    )
    .unwrap();
    let parser = LogParser::new(dir.path(), filter());

    for _ in 0..2 {
      let records: Vec<_> = parser.records("mutex").unwrap().collect();
      assert_eq!(records.len(), 1);
    }
  }
}
