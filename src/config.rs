//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/tasktree/tasktree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `TASKTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// Unified configuration for tasktree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Task list document (default: <data_dir>/tasks.yaml)
    pub tasklist_file: PathBuf,
    /// Flat preferences document (default: <config_dir>/preferences.yaml)
    pub preferences_file: PathBuf,
    /// Leave finished tasks out of `show`
    pub hide_done: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let (data_dir, config_dir) = match project_dirs() {
            Some(dirs) => (
                dirs.data_dir().to_path_buf(),
                dirs.config_dir().to_path_buf(),
            ),
            None => (PathBuf::from("~/.tasktree"), PathBuf::from("~/.tasktree")),
        };
        Self {
            tasklist_file: data_dir.join("tasks.yaml"),
            preferences_file: config_dir.join("preferences.yaml"),
            hide_done: false,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tasklist_file: Option<PathBuf>,
    pub preferences_file: Option<PathBuf>,
    pub hide_done: Option<bool>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tasktree")
}

/// Get the XDG config directory for tasktree.
pub fn global_config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("tasktree.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path fields.
    fn expand_paths(&mut self) {
        self.tasklist_file = PathBuf::from(expand_env_vars(
            self.tasklist_file.to_string_lossy().as_ref(),
        ));
        self.preferences_file = PathBuf::from(expand_env_vars(
            self.preferences_file.to_string_lossy().as_ref(),
        ));
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tasklist_file: overlay
                .tasklist_file
                .clone()
                .unwrap_or_else(|| self.tasklist_file.clone()),
            preferences_file: overlay
                .preferences_file
                .clone()
                .unwrap_or_else(|| self.preferences_file.clone()),
            hide_done: overlay.hide_done.unwrap_or(self.hide_done),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; it must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("config: global {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!("config: explicit {}", path.display());
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply TASKTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(Environment::with_prefix("TASKTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("tasklist_file") {
            settings.tasklist_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("preferences_file") {
            settings.preferences_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_bool("hide_done") {
            settings.hide_done = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# tasktree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/tasktree/tasktree.toml
#   Explicit: tasktree --config <file>
#   Env:      TASKTREE_* environment variables (explicit overrides)

# Task list document
# tasklist_file = "~/.local/share/tasktree/tasks.yaml"

# Flat preferences document
# preferences_file = "~/.config/tasktree/preferences.yaml"

# Leave finished tasks out of `tasktree show`
# hide_done = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_points_at_yaml_documents() {
        let settings = Settings::default();
        assert!(settings.tasklist_file.ends_with("tasks.yaml"));
        assert!(settings.preferences_file.ends_with("preferences.yaml"));
        assert!(!settings.hide_done);
    }

    #[test]
    fn given_tilde_in_paths_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            tasklist_file: PathBuf::from("~/tasks.yaml"),
            preferences_file: PathBuf::from("${HOME}/prefs.yaml"),
            hide_done: false,
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.tasklist_file.starts_with(&home));
        assert!(settings.preferences_file.starts_with(&home));
        assert!(!settings.tasklist_file.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings {
            tasklist_file: PathBuf::from("/base/tasks.yaml"),
            preferences_file: PathBuf::from("/base/prefs.yaml"),
            hide_done: false,
        };
        let overlay = RawSettings {
            tasklist_file: Some(PathBuf::from("/overlay/tasks.yaml")),
            preferences_file: None,
            hide_done: Some(true),
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.tasklist_file, PathBuf::from("/overlay/tasks.yaml"));
        assert_eq!(result.preferences_file, PathBuf::from("/base/prefs.yaml"));
        assert!(result.hide_done);
    }

    #[test]
    fn given_settings_when_rendering_toml_then_parses_back() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn given_template_when_parsed_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.tasklist_file.is_none());
    }
}
