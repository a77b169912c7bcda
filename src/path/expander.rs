use std::path::{Path, PathBuf};

/// Tilde expansion against a fixed home directory.
#[derive(Debug, Clone)]
pub struct PathExpander {
    home: PathBuf,
}

impl PathExpander {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Expands a leading `~` or `~/`. `~user` forms are left as written.
    pub fn expand(&self, path: &str) -> PathBuf {
        if path == "~" {
            return self.home.clone();
        }

        match path.strip_prefix("~/") {
            Some(stripped) => {
                let mut home_path = self.home.clone();
                for part in stripped.split('/') {
                    if !part.is_empty() {
                        home_path.push(part);
                    }
                }
                home_path
            }
            None => Path::new(path).to_path_buf(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}
