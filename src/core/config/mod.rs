use std::fmt;
use std::path::PathBuf;

mod loader;
mod paths;

pub use loader::ConfigLoader;
pub use paths::ConfigPaths;

use crate::core::status::Status;
use crate::shell::streams::Streams;
use crate::shell::Shell;

/// Startup configuration: the rc file run before the first prompt.
pub struct Config {
    paths: ConfigPaths,
}

impl Config {
    /// Uses `explicit` when given, `~/.veinrc` otherwise.
    pub fn new(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let paths = match explicit {
            Some(path) => ConfigPaths::explicit(path),
            None => ConfigPaths::new()?,
        };
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Runs the rc file through `shell`. A terminal Status from any line is
    /// handed back and the rest of the file is skipped.
    pub fn load(
        &self,
        shell: &mut Shell,
        streams: &mut Streams<'_>,
    ) -> Result<Option<Status>, ConfigError> {
        ConfigLoader::new(&self.paths).load(shell, streams)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    HomeDirNotFound,
    ConfigFileNotFound(String),
    IoError(std::io::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "Home directory not found"),
            ConfigError::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
