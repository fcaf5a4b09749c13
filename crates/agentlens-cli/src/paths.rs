use std::path::PathBuf;

/// Well-known paths under `.agentlens/`.
#[derive(Debug, Clone)]
pub struct LensPaths {
    pub root: PathBuf,
    pub lens_dir: PathBuf,
    pub config_json: PathBuf,
}

impl LensPaths {
    /// Derive all paths from a working directory. Pure computation, no I/O.
    pub fn discover(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let lens_dir = root.join(".agentlens");
        Self {
            config_json: lens_dir.join("config.json"),
            lens_dir,
            root,
        }
    }

    /// Resolve a user-supplied directory against the working directory.
    pub fn resolve(&self, dir: &str) -> PathBuf {
        self.root.join(dir)
    }
}
