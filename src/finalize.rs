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
use crate::command::CommandArgs;
use crate::error::FinalizeError;
use crate::render::CHART_EXTENSION;
use crate::render::Chart;
use std::path::Path;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;

/// Keeps ASCII alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
pub fn sanitize_test_name(name: &str) -> String {
  let sanitized: String = name
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
        c
      } else {
        '_'
      }
    })
    .collect();

  // A bare `.` or `..` would name a directory.
  match sanitized.trim_matches('.') {
    "" => "_".to_string(),
    _ => sanitized,
  }
}

/// `<dir>/<stem>-crop.<ext>` for a chart at `<dir>/<stem>.<ext>`.
pub fn cropped_path(path: &Path) -> PathBuf {
  let stem = path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  path.with_file_name(format!("{stem}-crop.{CHART_EXTENSION}"))
}

/// Where a chart ended up and whether the crop step took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
  pub path: PathBuf,
  pub cropped: bool,
}

/// Writes charts to the output directory and crops them in place.
pub struct OutputFinalizer<'a> {
  graph_dir: &'a Path,
  crop: Option<&'a CommandArgs>,
}

impl<'a> OutputFinalizer<'a> {
  pub fn new(graph_dir: &'a Path, crop: Option<&'a CommandArgs>) -> Self {
    Self { graph_dir, crop }
  }

  pub fn chart_path(&self, test_name: &str) -> PathBuf {
    self.graph_dir.join(format!(
      "{}.{CHART_EXTENSION}",
      sanitize_test_name(test_name)
    ))
  }

  /// Writes `chart`, overwriting any previous file, then runs the crop tool.
  ///
  /// Crop failures are logged and leave the uncropped chart in place.
  pub async fn finalize(&self, chart: &Chart) -> Result<Finalized, FinalizeError> {
    tokio::fs::create_dir_all(self.graph_dir)
      .await
      .map_err(|source| FinalizeError::CreateDir {
        path: self.graph_dir.to_path_buf(),
        source,
      })?;

    let path = self.chart_path(&chart.test_name);
    tokio::fs::write(&path, chart.svg.as_bytes())
      .await
      .map_err(|source| FinalizeError::Write {
        path: path.clone(),
        source,
      })?;
    tracing::info!(path = %path.display(), "Chart written");

    let Some(crop) = self.crop else {
      return Ok(Finalized {
        path,
        cropped: false,
      });
    };

    let cropped = match crop_in_place(crop, &path).await {
      Ok(()) => true,
      Err(e) if e.is_external_tool_failure() => {
        tracing::warn!(error = %e, path = %path.display(), "Crop step failed; keeping uncropped chart");
        false
      }
      Err(e) => return Err(e),
    };

    Ok(Finalized { path, cropped })
  }
}

/// Runs the crop tool on `path` and moves its `-crop` output over `path`.
async fn crop_in_place(crop: &CommandArgs, path: &Path) -> Result<(), FinalizeError> {
  let cropped = cropped_path(path);
  // Stale output from an earlier run must be gone before the tool runs.
  match tokio::fs::remove_file(&cropped).await {
    Ok(()) => tracing::debug!(path = %cropped.display(), "Removed stale crop output"),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
    Err(source) => {
      return Err(FinalizeError::RemoveStaleCrop {
        path: cropped,
        source,
      });
    }
  }

  let mut cmd = crop.for_target(path);
  tracing::debug!(cmd = ?cmd, "Spawning crop tool");
  let mut child = cmd.spawn().map_err(|source| FinalizeError::SpawnCropTool {
    command: crop.command.clone(),
    source,
  })?;

  if let Some(stderr) = child.stderr.take() {
    if let Err(e) = read_and_log_stderr(stderr, &crop.command).await {
      tracing::warn!(error = %e, "Failed to read crop tool stderr");
    }
  }

  let status = child
    .wait()
    .await
    .map_err(|source| FinalizeError::SpawnCropTool {
      command: crop.command.clone(),
      source,
    })?;

  if !status.success() {
    return Err(FinalizeError::CropToolFailed {
      command: crop.command.clone(),
      code: status.code(),
    });
  }

  if !tokio::fs::try_exists(&cropped).await.unwrap_or(false) {
    return Err(FinalizeError::CropOutputMissing { path: cropped });
  }

  tokio::fs::rename(&cropped, path)
    .await
    .map_err(|source| FinalizeError::ReplaceWithCropped {
      path: path.to_path_buf(),
      source,
    })?;

  tracing::debug!(path = %path.display(), "Chart cropped");
  Ok(())
}

/// Forwards every stderr line of the crop tool to the log.
async fn read_and_log_stderr<R: AsyncRead + Unpin>(stream: R, tool: &str) -> std::io::Result<()> {
  let mut reader = BufReader::new(stream).lines();

  while let Some(line) = reader.next_line().await? {
    tracing::warn!(tool, "{}", line);
  }
  Ok(())
}
