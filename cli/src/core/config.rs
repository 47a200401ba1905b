//! # targz Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! Loads the settings `targz pack` falls back to when a flag is not given:
//! compression level, output directory and output file name.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags (applied by the command handler, not here)
//! 2. Project-specific `.targz.toml` in the current directory or an ancestor
//!    (the search stops at the first directory containing `.git`)
//! 3. User-specific `config.toml` in the platform config directory
//!    (e.g. `~/.config/targz/config.toml`)
//! 4. Default values defined in the code
//!
//! After merging, `~` in the output directory is expanded and the result is
//! validated. Unknown keys are rejected.
//!
//! ## Examples
//!
//! ```toml
//! [compress]
//! level = 6
//!
//! [output]
//! directory = "~/dist"
//! name = "bundle.tar.gz"
//! ```
//!
//! ```rust
//! let cfg = config::load_config()?;
//! let level = cfg.compression_level()?;
//! let out_dir = &cfg.output.directory;
//! ```
//!
use crate::core::error::{CliError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use targz::output::DEFAULT_ARCHIVE_NAME;
use targz::CompressionLevel;
use tracing::{debug, info, warn};

/// Resolved configuration after all sources are merged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub compress: CompressConfig,
    pub output: OutputConfig,
}

/// Resolved `[compress]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressConfig {
    /// DEFLATE effort, 0 (store) to 9 (best).
    pub level: u8,
}

/// Resolved `[output]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Directory archives are saved into (can use ~). Will be expanded.
    pub directory: String,
    /// File name used when `-o` is not given; `.tar.gz` is appended if missing.
    pub name: String,
}

/// One configuration file as written. Keys left out are `None` and fall
/// through to the next source.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub compress: CompressSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// `[compress]` section of a configuration file.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CompressSection {
    pub level: Option<u8>,
}

/// `[output]` section of a configuration file.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    pub directory: Option<String>,
    pub name: Option<String>,
}

impl Default for CompressConfig {
    fn default() -> Self {
        CompressConfig {
            level: default_level(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: default_output_dir(),
            name: default_output_name(),
        }
    }
}

impl Config {
    /// The configured level as the library type.
    pub fn compression_level(&self) -> Result<CompressionLevel> {
        CompressionLevel::new(self.compress.level)
            .map_err(|e| anyhow!(CliError::Config(e.to_string())))
    }

    /// Overrides every setting the file actually sets.
    fn apply(&mut self, file: ConfigFile) {
        if let Some(level) = file.compress.level {
            self.compress.level = level;
        }
        if let Some(directory) = file.output.directory {
            self.output.directory = directory;
        }
        if let Some(name) = file.output.name {
            self.output.name = name;
        }
    }
}

fn default_level() -> u8 {
    CompressionLevel::BEST.get()
}
fn default_output_dir() -> String {
    ".".to_string()
}
fn default_output_name() -> String {
    DEFAULT_ARCHIVE_NAME.to_string()
}

const PROJECT_CONFIG_FILENAME: &str = ".targz.toml";

/// Loads, merges, expands and validates configuration for the current directory.
pub fn load_config() -> Result<Config> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    load_config_from(&current_dir)
}

/// Same as `load_config`, searching for the project file upwards from `start`.
pub fn load_config_from(start: &Path) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config(start)?;
    let mut merged_config = merge_configs(user_config, project_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<ConfigFile>> {
    if let Some(proj_dirs) = ProjectDirs::from("org", "targz", "targz") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(start: &Path) -> Result<Option<ConfigFile>> {
    if let Some(project_config_path) = find_project_config_path(start) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!(
            "No project configuration file ({}) found in {} or ancestors.",
            PROJECT_CONFIG_FILENAME,
            start.display()
        );
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Starts from the defaults, then applies the user file and the project file.
/// A key present in the project file wins even when it equals the default.
fn merge_configs(user: Option<ConfigFile>, project: Option<ConfigFile>) -> Config {
    let mut merged = Config::default();
    for layer in [user, project].into_iter().flatten() {
        merged.apply(layer);
    }
    merged
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    config.output.directory = shellexpand::tilde(&config.output.directory).into_owned();
    debug!("Expanded output directory: {}", config.output.directory);
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    config.compression_level()?;
    if config.output.name.trim().is_empty() {
        return Err(anyhow!(CliError::Config(
            "Output name cannot be empty.".to_string()
        )));
    }
    if config.output.directory.trim().is_empty() {
        return Err(anyhow!(CliError::Config(
            "Output directory cannot be empty.".to_string()
        )));
    }
    let out_dir = PathBuf::from(&config.output.directory);
    if out_dir.exists() && !out_dir.is_dir() {
        return Err(anyhow!(CliError::Config(format!(
            "Configured output path '{}' exists but is not a directory.",
            out_dir.display()
        ))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use directories::BaseDirs;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_basic_toml() {
        let toml_content = r#"
            [compress]
            level = 4

            [output]
            directory = "~/dist"
        "#;

        let file: ConfigFile = toml::from_str(toml_content).expect("Failed to parse TOML");
        assert_eq!(file.compress.level, Some(4));
        assert_eq!(file.output.directory.as_deref(), Some("~/dist")); // Not yet expanded
        assert_eq!(file.output.name, None);

        let config = merge_configs(Some(file), None);
        assert_eq!(config.compress.level, 4);
        assert_eq!(config.output.name, "archive.tar.gz"); // Default
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result: std::result::Result<ConfigFile, _> = toml::from_str("[compress]\nlevle = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_prefers_project_values() {
        let user: ConfigFile = toml::from_str(
            r#"
            [compress]
            level = 1
            [output]
            directory = "/user/out"
            name = "user.tar.gz"
        "#,
        )
        .unwrap();
        let project: ConfigFile = toml::from_str("[output]\nname = \"project\"\n").unwrap();

        let merged = merge_configs(Some(user.clone()), Some(project));
        assert_eq!(merged.compress.level, 1);
        assert_eq!(merged.output.directory, "/user/out");
        assert_eq!(merged.output.name, "project");

        let user_only = merge_configs(Some(user), None);
        assert_eq!(user_only.output.name, "user.tar.gz");
        assert_eq!(merge_configs(None, None), Config::default());
    }

    #[test]
    fn test_project_value_equal_to_default_still_wins() {
        let user: ConfigFile = toml::from_str(
            r#"
            [compress]
            level = 1
            [output]
            directory = "/user/out"
            name = "user.tar.gz"
        "#,
        )
        .unwrap();
        let project: ConfigFile = toml::from_str(
            r#"
            [compress]
            level = 9
            [output]
            directory = "."
            name = "archive.tar.gz"
        "#,
        )
        .unwrap();

        let merged = merge_configs(Some(user), Some(project));
        assert_eq!(merged, Config::default());
        assert_eq!(merged.compress.level, 9);
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config {
            output: OutputConfig {
                directory: "~/archives".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        expand_config_paths(&mut config).unwrap();

        let home_dir = BaseDirs::new().unwrap().home_dir().to_path_buf();
        assert_eq!(
            config.output.directory,
            home_dir.join("archives").to_string_lossy()
        );

        let mut absolute = Config::default();
        absolute.output.directory = "/absolute/path".to_string();
        expand_config_paths(&mut absolute).unwrap();
        assert_eq!(absolute.output.directory, "/absolute/path");
    }

    #[test]
    fn test_validate_config_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_config_invalid_level() {
        let mut config = Config::default();
        config.compress.level = 12;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("compression level 12 is outside 0-9"));
    }

    #[test]
    fn test_validate_config_empty_name() {
        let mut config = Config::default();
        config.output.name = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Output name cannot be empty"));
    }

    #[test]
    fn test_validate_config_output_path_is_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("not_a_dir");
        fs::write(&file_path, "").unwrap();

        let mut config = Config::default();
        config.output.directory = file_path.to_string_lossy().to_string();
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("is not a directory"));
    }

    #[test]
    fn test_find_project_config_walks_up() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(PROJECT_CONFIG_FILENAME), "[compress]\nlevel = 3\n").unwrap();
        let nested = root.join("a/b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_project_config_path(&nested),
            Some(root.join(PROJECT_CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_find_project_config_stops_at_git() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(PROJECT_CONFIG_FILENAME), "").unwrap();
        let repo = root.join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert_eq!(find_project_config_path(&repo), None);
    }
}
