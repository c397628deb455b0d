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
use Commands::Dump;
use Commands::Render;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tmgraph::cli::Cli;
use tmgraph::cli::Commands;
use tmgraph::config::Config;
use tmgraph::logging::setup_tracing;
use tmgraph::pipeline::dump_series;
use tmgraph::pipeline::render_all;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<()> {
  let _log_guard = setup_tracing()?;

  let Cli { command } = Cli::parse();
  let main_span = tracing::info_span!("tmgraph");

  async {
    match command {
      Render(args) => {
        tracing::info!("Resolving configuration...");
        let config = Config::try_from(&args).context("Invalid configuration")?;

        tracing::info!(
          data_dir = %config.data_dir.display(),
          graph_dir = %config.graph_dir.display(),
          families = ?config.families,
          "Starting render"
        );
        render_all(&config).await;
      }
      Dump(args) => {
        let config = Config::try_from(&args).context("Invalid configuration")?;
        let lines = dump_series(&config, std::io::stdout().lock())
          .context("Failed to write series dump")?;
        tracing::info!(lines, "Dump complete");
      }
    }

    Ok::<(), anyhow::Error>(())
  }
  .instrument(main_span)
  .await
}
