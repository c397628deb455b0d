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
use crate::cli::RenderArgs;
use crate::command::CommandArgs;
use crate::error::ConfigError;
use crate::parser::RecordFilter;
use crate::style::FamilyStyle;
use crate::style::StyleTable;
use crate::style::default_styles;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Serialized;
use figment::providers::Toml;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Prefix of the environment variables that override settings.
pub const ENV_PREFIX: &str = "TMGRAPH_";

/// Raw, layered settings before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
  pub data_dir: PathBuf,
  pub graph_dir: PathBuf,
  pub suite_title: String,
  pub families: Vec<String>,
  pub baseline_family: String,
  pub min_input_size: f64,
  pub thread_counts: Vec<u32>,
  pub crop_enabled: bool,
  pub crop_command: String,
  #[serde(default)]
  pub crop_args: Vec<String>,
  pub styles: BTreeMap<String, FamilyStyle>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir: PathBuf::from("./doc/tests/outputs/8core"),
      graph_dir: PathBuf::from("./doc/tests/graphs/8core"),
      suite_title: "8 core configuration".to_string(),
      families: vec![
        "onethread".to_string(),
        "mutex".to_string(),
        "tm-tiny".to_string(),
      ],
      baseline_family: "onethread".to_string(),
      min_input_size: 10000.0,
      thread_counts: vec![2, 4, 8, 16],
      crop_enabled: true,
      crop_command: "svgcrop".to_string(),
      crop_args: Vec::new(),
      styles: default_styles(),
    }
  }
}

/// CLI values that take precedence over every other layer.
#[derive(Debug, Default, Serialize)]
struct Overrides {
  #[serde(skip_serializing_if = "Option::is_none")]
  data_dir: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  graph_dir: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  suite_title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  crop_command: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  crop_enabled: Option<bool>,
}

impl From<&RenderArgs> for Overrides {
  fn from(args: &RenderArgs) -> Self {
    Self {
      data_dir: args.data_dir.clone(),
      graph_dir: args.graph_dir.clone(),
      suite_title: args.title.clone(),
      crop_command: args.crop_command.clone(),
      crop_enabled: args.no_crop.then_some(false),
    }
  }
}

/// Fully validated and resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
  pub data_dir: PathBuf,
  pub graph_dir: PathBuf,
  pub suite_title: String,
  pub families: Vec<String>,
  pub filter: RecordFilter,
  pub styles: StyleTable,
  pub crop: Option<CommandArgs>,
}

impl Config {
  /// Validates layered settings; every family must have a style entry.
  pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
    let Settings {
      data_dir,
      graph_dir,
      suite_title,
      families,
      baseline_family,
      min_input_size,
      thread_counts,
      crop_enabled,
      crop_command,
      crop_args,
      styles,
    } = settings;

    if families.is_empty() {
      return Err(ConfigError::NoFamilies);
    }
    if thread_counts.is_empty() {
      return Err(ConfigError::NoThreadCounts);
    }
    if let Some(&bad) = thread_counts.iter().find(|t| !t.is_power_of_two()) {
      return Err(ConfigError::ThreadCountNotPowerOfTwo(bad));
    }

    let styles = StyleTable::validated(styles, &families)?;

    let crop = crop_enabled.then(|| CommandArgs {
      command: crop_command,
      args: crop_args,
    });

    Ok(Config {
      data_dir,
      graph_dir,
      suite_title,
      families,
      filter: RecordFilter {
        min_input_size,
        baseline_family,
        thread_counts,
      },
      styles,
      crop,
    })
  }
}

impl TryFrom<&RenderArgs> for Config {
  type Error = ConfigError;

  fn try_from(args: &RenderArgs) -> Result<Self, Self::Error> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    if let Some(path) = &args.config {
      if !path.exists() {
        return Err(ConfigError::FileNotFound(path.clone()));
      }
      figment = figment.merge(Toml::file(path));
    }

    let settings: Settings = figment
      .merge(Env::prefixed(ENV_PREFIX))
      .merge(Serialized::defaults(Overrides::from(args)))
      .extract()
      .map_err(Box::new)?;

    tracing::debug!(?settings, "Resolved settings");

    Config::from_settings(settings)
  }
}
