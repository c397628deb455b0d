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
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Holds the executable and base arguments of the external crop tool.
///
/// The tool is invoked as `<command> <args...> <chart path>` and is expected
/// to write `<stem>-crop.<ext>` next to the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgs {
  /// The command to execute (e.g., "svgcrop" or "/usr/local/bin/svgcrop").
  pub command: String,

  /// Base arguments placed before the chart path.
  pub args: Vec<String>,
}

impl CommandArgs {
  pub fn new(command: impl Into<String>) -> Self {
    Self {
      command: command.into(),
      args: Vec::new(),
    }
  }

  /// Builds the process invocation for one chart file.
  pub fn for_target(&self, target: &Path) -> Command {
    let mut cmd = Command::new(&self.command);
    cmd
      .args(&self.args)
      .arg(target)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::piped())
      .kill_on_drop(true);
    cmd
  }
}
