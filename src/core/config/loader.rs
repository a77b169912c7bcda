use std::fs;

use tracing::debug;

use super::{ConfigError, ConfigPaths};
use crate::core::status::Status;
use crate::shell::streams::Streams;
use crate::shell::Shell;

pub struct ConfigLoader<'a> {
    paths: &'a ConfigPaths,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(paths: &'a ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn load(
        &self,
        shell: &mut Shell,
        streams: &mut Streams<'_>,
    ) -> Result<Option<Status>, ConfigError> {
        let path = &self.paths.rc_path;
        if !path.exists() {
            if self.paths.explicit {
                return Err(ConfigError::ConfigFileNotFound(path.display().to_string()));
            }
            debug!(path = %path.display(), "no rc file");
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading rc file");
        for line in content.lines() {
            if let Some(status) = self.process_line(line, shell, streams) {
                return Ok(Some(status));
            }
        }
        Ok(None)
    }

    fn process_line(
        &self,
        line: &str,
        shell: &mut Shell,
        streams: &mut Streams<'_>,
    ) -> Option<Status> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let status = shell.execute_line(line, streams);
        status.exit().then_some(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::SessionState;
    use crate::test_support::CwdGuard;
    use std::path::Path;

    fn shell() -> Shell {
        Shell::new(SessionState::with_identity("t", "h", "/").expect("session"))
    }

    fn load(paths: &ConfigPaths, shell: &mut Shell) -> (Result<Option<Status>, ConfigError>, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = {
            let mut streams = Streams::captured(&mut out, &mut err);
            ConfigLoader::new(paths).load(shell, &mut streams)
        };
        (result, String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_runs_lines_in_order() {
        let _guard = CwdGuard::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let rc = dir.path().join("rc");
        fs::write(&rc, "# greeting\n\necho one\n  echo two | cat\nsh -c 'exit 6'\n").expect("write rc");

        let mut shell = shell();
        let (result, stdout) = load(&ConfigPaths::explicit(&rc), &mut shell);
        assert!(result.expect("load").is_none());
        assert_eq!(stdout, "one\ntwo\n");
        assert_eq!(shell.session().last_exit_code(), 6);
    }

    #[test]
    fn test_exit_stops_loading() {
        let _guard = CwdGuard::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let rc = dir.path().join("rc");
        fs::write(&rc, "exit 3\necho never\n").expect("write rc");

        let mut shell = shell();
        let (result, stdout) = load(&ConfigPaths::explicit(&rc), &mut shell);
        let status = result.expect("load").expect("terminal status");
        assert!(status.exit());
        assert_eq!(status.code(), 3);
        assert_eq!(stdout, "");
    }

    #[test]
    fn test_missing_files() {
        let _guard = CwdGuard::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let mut shell = shell();

        let (result, _) = load(&ConfigPaths::for_home(dir.path()), &mut shell);
        assert!(result.expect("default rc is optional").is_none());

        let missing = ConfigPaths::explicit(Path::new(dir.path()).join("absent"));
        let (result, _) = load(&missing, &mut shell);
        assert!(matches!(result, Err(ConfigError::ConfigFileNotFound(_))));
    }
}
