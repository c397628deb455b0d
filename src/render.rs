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
use crate::error::RenderError;
use crate::series::Series;
use crate::series::TestCaseGraph;
use crate::style::FamilyStyle;
use crate::style::LineStyle;
use crate::style::MarkerShape;
use crate::style::StyleTable;
use crate::style::marker_size;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::ops::Range;

/// File extension of rendered charts.
pub const CHART_EXTENSION: &str = "svg";

const CHART_SIZE: (u32, u32) = (1024, 768);
const LINE_WIDTH: u32 = 2;

/// A finished chart, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct Chart {
  pub test_name: String,
  pub svg: String,
}

/// One line of a chart, in legend order.
#[derive(Debug, Clone)]
pub struct PlannedLine<'g> {
  pub config_id: &'g str,
  pub series: &'g Series,
  pub style: FamilyStyle,
  pub marker_size: u32,
  pub color: RGBAColor,
}

pub struct GraphRenderer<'a> {
  styles: &'a StyleTable,
  suite_title: &'a str,
}

fn backend_error(test: &str, err: impl std::fmt::Display) -> RenderError {
  RenderError::Backend {
    test: test.to_string(),
    message: err.to_string(),
  }
}

/// Axis range covering `values`, widened when all values coincide.
fn axis_range(values: impl Iterator<Item = f64>, from_zero: bool) -> Range<f64> {
  let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
    (lo.min(v), hi.max(v))
  });
  if !min.is_finite() || !max.is_finite() {
    return 0.0..1.0;
  }

  let lo = if from_zero { 0.0_f64.min(min) } else { min };
  let span = max - lo;
  let pad = if span > 0.0 { span * 0.05 } else { max.abs().max(1.0) * 0.1 };

  if from_zero {
    lo..(max + pad)
  } else {
    (lo - pad)..(max + pad)
  }
}

impl<'a> GraphRenderer<'a> {
  pub fn new(styles: &'a StyleTable, suite_title: &'a str) -> Self {
    Self {
      styles,
      suite_title,
    }
  }

  /// Orders the series by config id and resolves their styles.
  ///
  /// Colours follow the sorted order; line and marker follow the family.
  pub fn plan<'g>(&self, graph: &'g TestCaseGraph) -> Result<Vec<PlannedLine<'g>>, RenderError> {
    graph
      .sorted_series()
      .into_iter()
      .enumerate()
      .map(|(idx, (config_id, series))| -> Result<PlannedLine<'g>, RenderError> {
        Ok(PlannedLine {
          config_id,
          series,
          style: self.styles.get(&series.config_family)?,
          marker_size: marker_size(series.thread_count),
          color: Palette99::pick(idx).to_rgba(),
        })
      })
      .collect()
  }

  /// Draws every series of `graph` as throughput against input size.
  ///
  /// Points are joined in the order they were read, so a series whose input
  /// sizes were not logged in increasing order zig-zags.
  pub fn render(&self, graph: &TestCaseGraph) -> Result<Chart, RenderError> {
    let test = graph.test_name.as_str();
    let lines = self.plan(graph)?;

    let x_range = axis_range(
      lines.iter().flat_map(|l| l.series.input_sizes().iter().copied()),
      false,
    );
    let y_range = axis_range(
      lines
        .iter()
        .flat_map(|l| l.series.throughputs().iter().map(|&t| t as f64)),
      true,
    );

    let mut svg = String::new();
    {
      let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
      root.fill(&WHITE).map_err(|e| backend_error(test, e))?;

      let mut chart = ChartBuilder::on(&root)
        .caption(graph.title(self.suite_title), ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| backend_error(test, e))?;

      chart
        .configure_mesh()
        .x_desc("Input size")
        .y_desc("Ops/s")
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()
        .map_err(|e| backend_error(test, e))?;

      for line in &lines {
        let points = line.series.points();
        let stroke = line.color.stroke_width(LINE_WIDTH);

        let anno = match line.style.line {
          LineStyle::Solid => chart.draw_series(LineSeries::new(points.clone(), stroke)),
          LineStyle::Dashed => {
            chart.draw_series(DashedLineSeries::new(points.clone(), 8, 4, stroke))
          }
        }
        .map_err(|e| backend_error(test, e))?;

        anno
          .label(line.series.title.clone())
          .legend(move |(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], stroke));

        let size = line.marker_size;
        let fill = line.color.filled();
        let half = size as i32;
        match line.style.marker {
          MarkerShape::Circle => chart.draw_series(points.iter().map(|&c| Circle::new(c, size, fill))),
          MarkerShape::Triangle => {
            chart.draw_series(points.iter().map(|&c| TriangleMarker::new(c, size, fill)))
          }
          MarkerShape::Cross => chart.draw_series(points.iter().map(|&c| Cross::new(c, size, stroke))),
          MarkerShape::Square => chart.draw_series(points.iter().map(|&c| {
            EmptyElement::at(c) + Rectangle::new([(-half, -half), (half, half)], fill)
          })),
          MarkerShape::Dot => {
            chart.draw_series(points.iter().map(|&c| Circle::new(c, (size / 2).max(1), fill)))
          }
        }
        .map_err(|e| backend_error(test, e))?;
      }

      chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| backend_error(test, e))?;

      root.present().map_err(|e| backend_error(test, e))?;
    }

    tracing::debug!(test, lines = lines.len(), "Rendered chart");

    Ok(Chart {
      test_name: graph.test_name.clone(),
      svg,
    })
  }
}
