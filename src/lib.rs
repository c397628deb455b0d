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

//! # tmgraph
//!
//! `tmgraph` turns the logs of the concurrency testers (single-threaded,
//! mutex and transactional-memory builds, run at several thread counts and
//! input sizes) into one throughput chart per test case.
//!
//! This crate contains the library behind the `tmgraph` CLI. The pipeline
//! stages can be driven on their own:
//!
//! ## Core Modules
//!
//! * [`parser`]: Reads `tester-<family>.txt` logs into validated
//!   [`parser::RawRecord`]s.
//! * [`series`]: Groups records into test case -> config id -> series.
//! * [`render`]: Draws one SVG chart per test case with `plotters`.
//! * [`finalize`]: Writes charts and runs the external crop tool.
//! * [`pipeline`]: Runs the stages in order and reports per-family and
//!   per-test failures without aborting the batch.
//! * [`config`]: Layers defaults, a TOML file, `TMGRAPH_*` env vars and CLI
//!   overrides into a validated [`config::Config`].
//! * [`style`]: The family -> line/marker style table.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`command`]: Defines the crop tool's `CommandArgs`.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod finalize;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod series;
pub mod style;
