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
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
  version,
  about = "Throughput charts from concurrency-tester benchmark logs"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Parse the tester logs and write one cropped chart per test case.
  Render(RenderArgs),

  /// Parse and aggregate the tester logs, printing every series as JSON Lines.
  Dump(RenderArgs),
}

/// Overrides layered on top of defaults, the config file and `TMGRAPH_*` env vars.
#[derive(Debug, Clone, Default, Args)]
pub struct RenderArgs {
  /// TOML file with settings (data_dir, graph_dir, families, styles, ...).
  #[arg(long, short = 'c')]
  pub config: Option<PathBuf>,

  /// Directory holding the `tester-<family>.txt` logs.
  #[arg(long)]
  pub data_dir: Option<PathBuf>,

  /// Directory receiving the charts.
  #[arg(long)]
  pub graph_dir: Option<PathBuf>,

  /// Suite title shown in every chart title.
  #[arg(long)]
  pub title: Option<String>,

  /// External tool invoked as `<tool> <chart>` to crop each chart.
  #[arg(long)]
  pub crop_command: Option<String>,

  /// Skip the crop step entirely.
  #[arg(long)]
  pub no_crop: bool,
}
