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
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error enum for the tmgraph library.
#[derive(Error, Debug)]
pub enum TmGraphError {
  #[error("Configuration error")]
  Config(#[from] ConfigError),

  #[error("Log parsing failed")]
  Parse(#[from] ParseError),

  #[error("Chart rendering failed")]
  Render(#[from] RenderError),

  #[error("Chart output failed")]
  Finalize(#[from] FinalizeError),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON serialization error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Errors related to settings resolution (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Config file not found: {0}")]
  FileNotFound(PathBuf),

  #[error("Failed to extract settings: {0}")]
  Extract(#[from] Box<figment::Error>),

  #[error("No configuration families defined")]
  NoFamilies,

  #[error("No valid thread counts defined")]
  NoThreadCounts,

  #[error("Thread count {0} is not a power of two")]
  ThreadCountNotPowerOfTwo(u32),

  #[error("Style table is missing families: {missing:?}")]
  MissingStyles { missing: Vec<String> },
}

/// Errors raised while reading a tester log (src/parser.rs).
#[derive(Error, Debug)]
pub enum ParseError {
  #[error("Log file for family '{family}' not found: {path}")]
  FileNotFound { family: String, path: PathBuf },

  #[error("Failed to open log file {path}")]
  Open {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to read log file {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Malformed record at {path}:{line_no}: cannot parse {field} from '{value}'")]
  MalformedRecord {
    path: PathBuf,
    line_no: usize,
    field: &'static str,
    value: String,
  },
}

/// Errors raised while drawing a chart (src/render.rs).
#[derive(Error, Debug)]
pub enum RenderError {
  #[error("No style defined for configuration family '{family}'")]
  UnknownStyle { family: String },

  #[error("Plotting backend failed for test '{test}': {message}")]
  Backend { test: String, message: String },
}

/// Errors raised while persisting and cropping a chart (src/finalize.rs).
#[derive(Error, Debug)]
pub enum FinalizeError {
  #[error("Failed to create output directory {path}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write chart {path}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to remove stale crop output {path}")]
  RemoveStaleCrop {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to spawn crop tool '{command}'")]
  SpawnCropTool {
    command: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Crop tool '{command}' exited with {code:?}")]
  CropToolFailed { command: String, code: Option<i32> },

  #[error("Crop tool did not produce {path}")]
  CropOutputMissing { path: PathBuf },

  #[error("Failed to replace {path} with its cropped variant")]
  ReplaceWithCropped {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl FinalizeError {
  /// Crop-step failures leave the uncropped chart in place and do not fail the test case.
  pub fn is_external_tool_failure(&self) -> bool {
    matches!(
      self,
      FinalizeError::RemoveStaleCrop { .. }
        | FinalizeError::SpawnCropTool { .. }
        | FinalizeError::CropToolFailed { .. }
        | FinalizeError::CropOutputMissing { .. }
        | FinalizeError::ReplaceWithCropped { .. }
    )
  }
}
