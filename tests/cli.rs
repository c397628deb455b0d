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
use assert_cmd::cargo;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;
use tempfile::tempdir;

use fs_extra::dir::CopyOptions;
use fs_extra::dir::copy;
use std::fs;

use serde_json::Value;

/// Copies `tests/fixtures/logs` into a fresh temp dir and returns (temp, logs dir).
fn fixture_logs() -> (TempDir, PathBuf) {
  let temp = tempdir().unwrap();
  copy("tests/fixtures/logs", temp.path(), &CopyOptions::new()).unwrap();
  let logs = temp.path().join("logs");
  (temp, logs)
}

fn tmgraph(subcommand: &str, data_dir: &Path, graph_dir: &Path) -> Command {
  let mut cmd = Command::new(cargo::cargo_bin!("tmgraph"));
  cmd
    .arg(subcommand)
    .arg("--data-dir")
    .arg(data_dir)
    .arg("--graph-dir")
    .arg(graph_dir)
    .env_remove("TMGRAPH_LOG_FILE")
    .env("RUST_LOG", "info")
    .env("CLICOLOR", "0");
  cmd
}

#[test]
fn test_dump_filters_and_orders_series() {
  let (temp, logs) = fixture_logs();

  let output = tmgraph("dump", &logs, &temp.path().join("graphs"))
    .output()
    .unwrap();
  assert!(output.status.success());

  let lines: Vec<Value> = String::from_utf8(output.stdout)
    .unwrap()
    .lines()
    .map(|l| serde_json::from_str(l).unwrap())
    .collect();

  let keys: Vec<(&str, &str)> = lines
    .iter()
    .map(|v| (v["test"].as_str().unwrap(), v["config_id"].as_str().unwrap()))
    .collect();
  assert_eq!(
    keys,
    vec![
      ("BankTest", "mutex_4"),
      ("BankTest", "tm-tiny_2"),
      ("TreeInsertTest", "mutex_8"),
    ]
  );

  // Encounter order is kept; 5000 is below the threshold.
  assert_eq!(lines[0]["input_sizes"], serde_json::json!([20000.0]));
  assert_eq!(lines[1]["input_sizes"], serde_json::json!([40000.0, 20000.0]));
  assert_eq!(lines[1]["throughputs"], serde_json::json!([8000, 10000]));
  assert_eq!(lines[1]["title"], "tm-tiny 2");
}

#[test]
fn test_render_without_crop_tool_keeps_charts() {
  let (temp, logs) = fixture_logs();
  let graphs = temp.path().join("graphs");

  tmgraph("render", &logs, &graphs)
    .arg("--crop-command")
    .arg("tmgraph-no-such-crop-tool")
    .assert()
    .success()
    .stderr(predicate::str::contains("Crop step failed"))
    .stderr(predicate::str::contains("Rendering complete"));

  let bank = fs::read_to_string(graphs.join("BankTest.svg")).unwrap();
  assert!(bank.contains("BankTest performance (8 core configuration)"));
  assert!(bank.find("mutex 4").unwrap() < bank.find("tm-tiny 2").unwrap());
  assert!(graphs.join("TreeInsertTest.svg").exists());
  assert!(!graphs.join("BankTest-crop.svg").exists());
}

#[cfg(unix)]
#[test]
fn test_render_crops_in_place() {
  let (temp, logs) = fixture_logs();
  let graphs = temp.path().join("graphs");
  let tool = temp.path().join("fake-crop.sh");
  fs::write(
    &tool,
    "#!/bin/sh\ncp \"$1\" \"${1%.svg}-crop.svg\"\necho '<!-- cropped -->' >> \"${1%.svg}-crop.svg\"\n",
  )
  .unwrap();

  tmgraph("render", &logs, &graphs)
    .env("TMGRAPH_CROP_COMMAND", "sh")
    .env("TMGRAPH_CROP_ARGS", format!("[\"{}\"]", tool.display()))
    .assert()
    .success();

  for test in ["BankTest", "TreeInsertTest"] {
    let chart = fs::read_to_string(graphs.join(format!("{test}.svg"))).unwrap();
    assert!(chart.ends_with("<!-- cropped -->\n"));
    assert!(!graphs.join(format!("{test}-crop.svg")).exists());
  }
}

#[test]
fn test_missing_family_log_does_not_abort() {
  let (temp, logs) = fixture_logs();
  let graphs = temp.path().join("graphs");
  fs::remove_file(logs.join("tester-tm-tiny.txt")).unwrap();

  tmgraph("render", &logs, &graphs)
    .arg("--no-crop")
    .assert()
    .success()
    .stderr(predicate::str::contains("Log file for family 'tm-tiny' not found"));

  let bank = fs::read_to_string(graphs.join("BankTest.svg")).unwrap();
  assert!(bank.contains("mutex 4"));
  assert!(!bank.contains("tm-tiny 2"));
}

#[test]
fn test_malformed_family_is_dropped() {
  let (temp, logs) = fixture_logs();
  fs::write(
    logs.join("tester-mutex.txt"),
    "> BankTest mutex OK 20000 4 2 2.500 8000\n> BankTest mutex OK 20000 four 2 2.500 8000\n",
  )
  .unwrap();

  let output = tmgraph("dump", &logs, &temp.path().join("graphs"))
    .output()
    .unwrap();
  assert!(output.status.success());
  assert!(
    String::from_utf8_lossy(&output.stderr).contains("cannot parse thread count from 'four'")
  );

  let stdout = String::from_utf8(output.stdout).unwrap();
  assert_eq!(stdout.lines().count(), 1);
  assert!(stdout.contains(r#""config_id":"tm-tiny_2""#));
}

#[test]
fn test_config_file_with_unstyled_family_fails() {
  let temp = tempdir().unwrap();
  let config = temp.path().join("tmgraph.toml");
  fs::write(&config, "families = [\"mutex\", \"tm-rtm\"]\n").unwrap();

  let mut cmd = Command::new(cargo::cargo_bin!("tmgraph"));
  cmd
    .arg("dump")
    .arg("--config")
    .arg(&config)
    .env("CLICOLOR", "0");

  cmd
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid configuration"));
}
