use std::env;
use std::ffi::CStr;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ShellError;

/// Per-process session record, read and written by built-ins.
///
/// Only the thread running the read-eval loop touches it, between prompts.
#[derive(Debug, Clone)]
pub struct SessionState {
    username: String,
    hostname: String,
    home_dir: PathBuf,
    work_dir: PathBuf,
    pid: u32,
    last_exit_code: i32,
}

impl SessionState {
    /// Resolves identity, host, home and working directory of this process.
    pub fn discover() -> Result<Self, ShellError> {
        let username = current_username()?;
        let hostname = current_hostname()?;
        let home_dir = dirs::home_dir().ok_or(ShellError::HomeDirNotFound)?;
        Self::with_identity(username, hostname, home_dir)
    }

    pub fn with_identity(
        username: impl Into<String>,
        hostname: impl Into<String>,
        home_dir: impl Into<PathBuf>,
    ) -> Result<Self, ShellError> {
        Ok(Self {
            username: username.into(),
            hostname: hostname.into(),
            home_dir: home_dir.into(),
            work_dir: env::current_dir()?,
            pid: std::process::id(),
            last_exit_code: 0,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn last_exit_code(&self) -> i32 {
        self.last_exit_code
    }

    pub fn set_last_exit_code(&mut self, code: i32) {
        self.last_exit_code = code;
    }

    /// Changes the process working directory. On any failure both the real
    /// cwd and `work_dir` stay where they were.
    pub fn change_dir(&mut self, target: &Path) -> io::Result<()> {
        env::set_current_dir(target)?;
        match env::current_dir() {
            Ok(dir) => {
                debug!(from = %self.work_dir.display(), to = %dir.display(), "changed directory");
                self.work_dir = dir;
                Ok(())
            }
            Err(e) => {
                let _ = env::set_current_dir(&self.work_dir);
                Err(e)
            }
        }
    }

    /// Working directory with the home prefix shown as `~`.
    pub fn display_dir(&self) -> String {
        match self.work_dir.strip_prefix(&self.home_dir) {
            Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
            Ok(rest) => format!("~/{}", rest.display()),
            Err(_) => self.work_dir.display().to_string(),
        }
    }

    pub fn prompt(&self) -> String {
        format!("{}@{}:{} $ ", self.username, self.hostname, self.display_dir())
    }
}

fn current_username() -> Result<String, ShellError> {
    let uid = unsafe { libc::getuid() };
    let mut buf: Vec<libc::c_char> = vec![0; 1024];

    loop {
        let mut passwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(uid, &mut passwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };

        if rc == libc::ERANGE && buf.len() < 1 << 20 {
            let grown = buf.len() * 2;
            buf.resize(grown, 0);
            continue;
        }
        if rc != 0 || result.is_null() || passwd.pw_name.is_null() {
            return env::var("USER").map_err(|_| ShellError::UserNotFound);
        }

        let name = unsafe { CStr::from_ptr(passwd.pw_name) };
        return Ok(name.to_string_lossy().into_owned());
    }
}

fn current_hostname() -> Result<String, ShellError> {
    let mut buf: Vec<libc::c_char> = vec![0; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr(), buf.len()) };
    if rc != 0 {
        return Err(io::Error::last_os_error().into());
    }
    // Truncated names are not guaranteed to be NUL-terminated.
    if let Some(last) = buf.last_mut() {
        *last = 0;
    }
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
    Ok(name.to_string_lossy().into_owned())
}
