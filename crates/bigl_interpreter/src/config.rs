use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Environment variable naming the directory `include` resolves relative paths against.
pub const MODULE_PATH_VAR: &str = "BIGL_PATH";

/// Settings an evaluator carries for its whole lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Directory for relative `include` paths; the working directory when unset
    pub module_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_var(env::var_os(MODULE_PATH_VAR))
    }

    fn from_var(value: Option<OsString>) -> Self {
        Config {
            module_path: value.filter(|v| !v.is_empty()).map(PathBuf::from),
        }
    }

    /// Where `include(file)` should read from.
    pub fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);

        match &self.module_path {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}
