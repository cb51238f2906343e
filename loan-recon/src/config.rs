use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_LOAN_FILES: usize = 7;
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ReconConfig {
    pub output: Option<OutputConfig>,
    pub input: Option<InputConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
    pub archive_compression_level: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct InputConfig {
    pub max_loan_files: Option<usize>,
}

/// Limits the orchestrator applies to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub max_loan_files: usize,
    pub compression_level: i64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_loan_files: DEFAULT_MAX_LOAN_FILES,
            compression_level: i64::from(DEFAULT_COMPRESSION_LEVEL),
        }
    }
}

impl ReconConfig {
    /// Loads settings from `path`, or from the default location when `None`.
    ///
    /// An explicitly given file must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let (config_path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (get_config_path(), false),
        };

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()).required(required))
            .build()?;

        let config: ReconConfig = builder.try_deserialize()?;

        if let Some(level) = config
            .output
            .as_ref()
            .and_then(|output| output.archive_compression_level)
        {
            if level > 9 {
                return Err(ConfigError::Message(format!(
                    "archive_compression_level must be between 0 and 9, got {level}"
                )));
            }
        }

        Ok((config, config_path))
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.output
            .as_ref()
            .and_then(|output| output.directory.as_deref())
    }

    pub fn run_settings(&self) -> RunSettings {
        let defaults = RunSettings::default();
        RunSettings {
            max_loan_files: self
                .input
                .as_ref()
                .and_then(|input| input.max_loan_files)
                .unwrap_or(defaults.max_loan_files),
            compression_level: self
                .output
                .as_ref()
                .and_then(|output| output.archive_compression_level)
                .map(i64::from)
                .unwrap_or(defaults.compression_level),
        }
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("loan-recon").join("recon.toml")
    } else {
        PathBuf::from("recon.toml")
    }
}
