use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::constants::constants;

/// User preferences persisted in `prefs.toml`.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  /// Portfolio file to browse instead of the built-in one.
  pub catalog_path: Option<PathBuf>,
  /// Command used for native MP4 playback.
  pub player_command: Option<String>,
}

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "reel")
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        return Self::parse(&content);
      }
    }
    Self::default()
  }

  /// Parse preferences, falling back to defaults when malformed.
  pub fn parse(content: &str) -> Self {
    match toml::from_str(content) {
      Ok(config) => config,
      Err(e) => {
        warn!("ignoring malformed prefs.toml: {}", e);
        Self::default()
      }
    }
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self)
          && let Err(e) = std::fs::write(config_file, content)
        {
          warn!("failed to save preferences: {}", e);
        }
      }
    }
  }

  pub fn player_command(&self) -> &str {
    self.player_command.as_deref().unwrap_or(&constants().player_command)
  }
}
