use crate::error::ShellError;

/// Outcome of one stage or one pipeline.
///
/// `exit` asks the read-eval loop to stop; it says nothing about whether the
/// program itself succeeded. Values are built through the constructors and
/// never changed afterwards.
#[derive(Debug)]
pub struct Status {
    exit: bool,
    code: i32,
    error: Option<ShellError>,
}

impl Status {
    pub fn success() -> Self {
        Self::with_code(0)
    }

    pub fn with_code(code: i32) -> Self {
        Self {
            exit: false,
            code,
            error: None,
        }
    }

    /// Ends the session with `code`.
    pub fn terminate(code: i32) -> Self {
        Self {
            exit: true,
            code,
            error: None,
        }
    }

    /// Recoverable failure; the code follows the kind of error.
    pub fn failure(error: impl Into<ShellError>) -> Self {
        let error = error.into();
        Self {
            exit: false,
            code: error.exit_code(),
            error: Some(error),
        }
    }

    /// The shell cannot go on (setup failure, output sink unwritable).
    pub fn fatal(error: impl Into<ShellError>) -> Self {
        Self {
            exit: true,
            code: 1,
            error: Some(error.into()),
        }
    }

    pub fn exit(&self) -> bool {
        self.exit
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn error(&self) -> Option<&ShellError> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.code == 0 && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessError;

    #[test]
    fn test_constructors() {
        let ok = Status::success();
        assert!(!ok.exit());
        assert!(ok.is_success());

        let done = Status::terminate(3);
        assert!(done.exit());
        assert_eq!(done.code(), 3);
        assert!(done.error().is_none());

        let fatal = Status::fatal(ShellError::HomeDirNotFound);
        assert!(fatal.exit());
        assert_eq!(fatal.code(), 1);
        assert!(fatal.error().is_some());
    }

    #[test]
    fn test_failure_code_follows_error() {
        let missing = Status::failure(ProcessError::CommandNotFound("nope".to_string()));
        assert!(!missing.exit());
        assert_eq!(missing.code(), 127);
        assert!(!missing.is_success());

        let generic = Status::failure(ShellError::UserNotFound);
        assert_eq!(generic.code(), 1);
    }
}
