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
use crate::config::Config;
use crate::error::ParseError;
use crate::error::TmGraphError;
use crate::finalize::OutputFinalizer;
use crate::parser::LogParser;
use crate::parser::RawRecord;
use crate::render::GraphRenderer;
use crate::series::SeriesAggregator;
use crate::series::SeriesDump;
use crate::series::TestCaseGraph;
use std::io::Write;
use tracing::Instrument;

/// Counts reported at the end of a `render` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
  pub charts_written: usize,
  pub charts_cropped: usize,
  pub tests_failed: usize,
}

/// Reads one family's log completely, dropping it on the first error.
fn read_family(parser: &LogParser, family: &str) -> Result<Vec<RawRecord>, ParseError> {
  parser.records(family)?.collect()
}

/// Parses every configured family and groups the records by test case.
///
/// A family whose log is missing or malformed contributes nothing; the
/// others are still aggregated.
pub fn collect_graphs(config: &Config) -> Vec<TestCaseGraph> {
  let parser = LogParser::new(&config.data_dir, config.filter.clone());
  let mut aggregator = SeriesAggregator::new();

  for family in &config.families {
    let span = tracing::info_span!("parse_family", family = %family);
    let _enter = span.enter();

    match read_family(&parser, family) {
      Ok(records) => {
        tracing::info!(records = records.len(), "Parsed tester log");
        aggregator.extend(records);
      }
      Err(e) => tracing::error!(error = %e, "Skipping family"),
    }
  }

  aggregator.finish()
}

/// Parses, aggregates, renders and writes one chart per test case.
pub async fn render_all(config: &Config) -> RunSummary {
  let graphs = collect_graphs(config);
  let renderer = GraphRenderer::new(&config.styles, &config.suite_title);
  let finalizer = OutputFinalizer::new(&config.graph_dir, config.crop.as_ref());
  let mut summary = RunSummary::default();

  tracing::info!(tests = graphs.len(), "--- Rendering charts ---");

  for graph in &graphs {
    let span = tracing::info_span!("chart", test = %graph.test_name);
    async {
      tracing::info!(series = graph.len(), "Rendering");

      let chart = match renderer.render(graph) {
        Ok(chart) => chart,
        Err(e) => {
          tracing::error!(error = %e, "Chart rendering failed");
          summary.tests_failed += 1;
          return;
        }
      };

      match finalizer.finalize(&chart).await {
        Ok(done) => {
          summary.charts_written += 1;
          if done.cropped {
            summary.charts_cropped += 1;
          }
        }
        Err(e) => {
          tracing::error!(error = %e, "Writing chart failed");
          summary.tests_failed += 1;
        }
      }
    }
    .instrument(span)
    .await;
  }

  tracing::info!(
    written = summary.charts_written,
    cropped = summary.charts_cropped,
    failed = summary.tests_failed,
    "--- Rendering complete ---"
  );

  summary
}

/// Writes every aggregated series as one JSON object per line.
///
/// Test cases come in name order, series in config id order.
pub fn dump_series<W: Write>(config: &Config, mut out: W) -> Result<usize, TmGraphError> {
  let mut lines = 0;

  for graph in collect_graphs(config) {
    for (config_id, series) in graph.sorted_series() {
      let line = SeriesDump {
        test: &graph.test_name,
        config_id,
        series,
      };
      serde_json::to_writer(&mut out, &line)?;
      writeln!(out)?;
      lines += 1;
    }
  }

  out.flush()?;
  Ok(lines)
}
