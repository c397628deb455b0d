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
use crate::error::ConfigError;
use crate::error::RenderError;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// How the line joining a series' points is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
  Solid,
  Dashed,
}

/// Shape drawn at every point of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
  Circle,
  Triangle,
  Cross,
  Square,
  Dot,
}

/// Line and marker style for one configuration family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyStyle {
  pub line: LineStyle,
  pub marker: MarkerShape,
}

impl FamilyStyle {
  pub const fn new(line: LineStyle, marker: MarkerShape) -> Self {
    Self { line, marker }
  }
}

/// Immutable family -> style mapping handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTable {
  styles: BTreeMap<String, FamilyStyle>,
}

impl StyleTable {
  /// Builds the table, failing if any of `families` has no entry.
  pub fn validated(
    styles: BTreeMap<String, FamilyStyle>,
    families: &[String],
  ) -> Result<Self, ConfigError> {
    let missing: Vec<String> = families
      .iter()
      .filter(|family| !styles.contains_key(family.as_str()))
      .cloned()
      .collect();

    if !missing.is_empty() {
      return Err(ConfigError::MissingStyles { missing });
    }

    Ok(Self { styles })
  }

  pub fn get(&self, family: &str) -> Result<FamilyStyle, RenderError> {
    self
      .styles
      .get(family)
      .copied()
      .ok_or_else(|| RenderError::UnknownStyle {
        family: family.to_string(),
      })
  }
}

/// The style table of the 8-core tester suite.
pub fn default_styles() -> BTreeMap<String, FamilyStyle> {
  [
    ("onethread", FamilyStyle::new(LineStyle::Solid, MarkerShape::Circle)),
    ("mutex", FamilyStyle::new(LineStyle::Solid, MarkerShape::Triangle)),
    ("tm-tiny", FamilyStyle::new(LineStyle::Solid, MarkerShape::Cross)),
    ("tm-gnu", FamilyStyle::new(LineStyle::Solid, MarkerShape::Dot)),
  ]
  .into_iter()
  .map(|(family, style)| (family.to_string(), style))
  .collect()
}

/// Marker radius in pixels; grows with log2 of the thread count.
pub fn marker_size(thread_count: i64) -> u32 {
  let scaled = 3.0 * (thread_count.max(1) as f64).log2();
  (scaled.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn families(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
  }

  #[test]
  fn validated_rejects_family_without_style() {
    let err = StyleTable::validated(default_styles(), &families(&["mutex", "tm-rtm"]))
      .expect_err("tm-rtm has no style");

    match err {
      ConfigError::MissingStyles { missing } => assert_eq!(missing, vec!["tm-rtm".to_string()]),
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn lookup_of_unknown_family_fails() {
    let table = StyleTable::validated(default_styles(), &families(&["mutex"])).unwrap();

    assert_eq!(
      table.get("mutex").unwrap(),
      FamilyStyle::new(LineStyle::Solid, MarkerShape::Triangle)
    );
    assert!(matches!(
      table.get("spinlock"),
      Err(RenderError::UnknownStyle { family }) if family == "spinlock"
    ));
  }

  #[test]
  fn marker_size_grows_with_thread_count() {
    let sizes: Vec<u32> = [2, 4, 8, 16].into_iter().map(marker_size).collect();
    assert_eq!(sizes, vec![3, 6, 9, 12]);
    assert_eq!(marker_size(1), 1);
  }
}
