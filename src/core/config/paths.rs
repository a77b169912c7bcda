use super::ConfigError;
use std::path::{Path, PathBuf};

pub const RC_FILE: &str = ".veinrc";

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
    /// Named on the command line; a missing file is then worth a warning.
    pub explicit: bool,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::for_home(&home))
    }

    pub fn for_home(home: &Path) -> Self {
        ConfigPaths {
            rc_path: home.join(RC_FILE),
            explicit: false,
        }
    }

    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        ConfigPaths {
            rc_path: path.into(),
            explicit: true,
        }
    }
}
