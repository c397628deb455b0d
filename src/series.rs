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

//! Grouping of records into plotted series.
//!
//! Points keep the order in which records were read; nothing here sorts by
//! input size. Only the configuration ids of a test case are ordered, and
//! only when [`TestCaseGraph::sorted_series`] is asked for them.

use crate::parser::RawRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Identifies one plotted line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
  pub test_name: String,
  pub config_family: String,
  pub thread_count: i64,
}

impl SeriesKey {
  pub fn of(record: &RawRecord) -> Self {
    Self {
      test_name: record.test_name.clone(),
      config_family: record.config_family.clone(),
      thread_count: record.thread_count,
    }
  }

  /// `<family>_<threads>`, unique within a test case.
  pub fn config_id(&self) -> String {
    format!("{}_{}", self.config_family, self.thread_count)
  }
}

/// Observations of one family at one thread count.
///
/// The three sequences always have the same length; index `i` of each
/// refers to the same record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
  #[serde(rename = "family")]
  pub config_family: String,
  #[serde(rename = "threads")]
  pub thread_count: i64,
  pub title: String,
  input_sizes: Vec<f64>,
  throughputs: Vec<i64>,
  elapsed_times: Vec<f64>,
}

impl Series {
  pub fn new(config_family: impl Into<String>, thread_count: i64) -> Self {
    let config_family = config_family.into();
    let title = format!("{config_family} {thread_count}");
    Self {
      config_family,
      thread_count,
      title,
      input_sizes: Vec::new(),
      throughputs: Vec::new(),
      elapsed_times: Vec::new(),
    }
  }

  pub fn push(&mut self, input_size: f64, throughput: i64, elapsed_time: f64) {
    self.input_sizes.push(input_size);
    self.throughputs.push(throughput);
    self.elapsed_times.push(elapsed_time);
  }

  pub fn input_sizes(&self) -> &[f64] {
    &self.input_sizes
  }

  pub fn throughputs(&self) -> &[i64] {
    &self.throughputs
  }

  pub fn elapsed_times(&self) -> &[f64] {
    &self.elapsed_times
  }

  pub fn len(&self) -> usize {
    self.input_sizes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.input_sizes.is_empty()
  }

  /// `(input size, throughput)` pairs in encounter order.
  pub fn points(&self) -> Vec<(f64, f64)> {
    self
      .input_sizes
      .iter()
      .zip(&self.throughputs)
      .map(|(&x, &y)| (x, y as f64))
      .collect()
  }
}

/// All series of one test case, keyed by config id.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseGraph {
  pub test_name: String,
  series: HashMap<String, Series>,
}

impl TestCaseGraph {
  pub fn new(test_name: impl Into<String>) -> Self {
    Self {
      test_name: test_name.into(),
      series: HashMap::new(),
    }
  }

  fn series_mut(&mut self, key: &SeriesKey) -> &mut Series {
    self
      .series
      .entry(key.config_id())
      .or_insert_with(|| Series::new(key.config_family.clone(), key.thread_count))
  }

  pub fn get(&self, config_id: &str) -> Option<&Series> {
    self.series.get(config_id)
  }

  pub fn len(&self) -> usize {
    self.series.len()
  }

  pub fn is_empty(&self) -> bool {
    self.series.is_empty()
  }

  /// Series ordered lexicographically by config id.
  ///
  /// This order fixes legend, colour and marker assignment, whatever order
  /// the logs were read in.
  pub fn sorted_series(&self) -> Vec<(&str, &Series)> {
    let mut ordered: Vec<(&str, &Series)> = self
      .series
      .iter()
      .map(|(id, series)| (id.as_str(), series))
      .collect();
    ordered.sort_unstable_by(|a, b| a.0.cmp(b.0));
    ordered
  }

  pub fn title(&self, suite_title: &str) -> String {
    format!("{} performance ({})", self.test_name, suite_title)
  }
}

/// Folds records from every family into test name -> config id -> series.
#[derive(Debug, Default)]
pub struct SeriesAggregator {
  graphs: BTreeMap<String, TestCaseGraph>,
}

impl SeriesAggregator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, record: RawRecord) {
    let key = SeriesKey::of(&record);
    self
      .graphs
      .entry(record.test_name)
      .or_insert_with_key(|name| TestCaseGraph::new(name.clone()))
      .series_mut(&key)
      .push(record.input_size, record.throughput_ops, record.elapsed_time);
  }

  /// Test cases ordered by name.
  pub fn finish(self) -> Vec<TestCaseGraph> {
    self.graphs.into_values().collect()
  }
}

impl Extend<RawRecord> for SeriesAggregator {
  fn extend<I: IntoIterator<Item = RawRecord>>(&mut self, records: I) {
    for record in records {
      self.add(record);
    }
  }
}

/// One line of `tmgraph dump` output.
#[derive(Debug, Serialize)]
pub struct SeriesDump<'a> {
  pub test: &'a str,
  pub config_id: &'a str,
  #[serde(flatten)]
  pub series: &'a Series,
}
