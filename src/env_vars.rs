//! Build environment variable handling.
//!
//! Stages never read the process environment directly. The binary takes one
//! [`BuildEnv`] snapshot at startup and hands it to every stage, so tests can
//! build arbitrary environments without touching process state.

use std::collections::BTreeMap;
use std::env;

/// Conda environment prefix; adds a runtime library search path.
pub const CONDA_PREFIX: &str = "CONDA_PREFIX";
/// Search path for `.pc` files.
pub const PKG_CONFIG_PATH: &str = "PKG_CONFIG_PATH";
/// Override for the `pkg-config` executable.
pub const PKG_CONFIG: &str = "PKG_CONFIG";
/// C compiler.
pub const CC: &str = "CC";
/// Extra C compiler flags.
pub const CFLAGS: &str = "CFLAGS";
/// Extra linker flags.
pub const LDFLAGS: &str = "LDFLAGS";
/// Path to a configuration file.
pub const CONFIG_PATH: &str = "CLAIR3_BUILD_CONFIG";
/// Enables debug logging ("1", "true", "yes").
pub const DEBUG: &str = "CLAIR3_BUILD_DEBUG";

/// Immutable snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    vars: BTreeMap<String, String>,
}

impl BuildEnv {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Look up a raw variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Whether the variable is present at all (an empty value still counts).
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Return a copy with one variable set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    // Boolean variables accept "1", "true", "yes" (case-insensitive)
    fn is_enabled(&self, key: &str) -> bool {
        self.get(key).is_some_and(|s| {
            let s = s.to_lowercase();
            s == "1" || s == "true" || s == "yes"
        })
    }

    // Whitespace-separated flag lists; empty values count as unset
    fn flag_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|s| s.split_whitespace().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Get the Conda environment prefix.
    pub fn conda_prefix(&self) -> Option<&str> {
        self.get(CONDA_PREFIX)
    }

    /// Get the `pkg-config` search path.
    pub fn pkg_config_path(&self) -> Option<&str> {
        self.get(PKG_CONFIG_PATH)
    }

    /// Get the `pkg-config` executable (defaults to `pkg-config`).
    pub fn pkg_config(&self) -> &str {
        self.get(PKG_CONFIG)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("pkg-config")
    }

    /// Get the C compiler (defaults to `cc`).
    pub fn cc(&self) -> &str {
        self.get(CC).filter(|s| !s.trim().is_empty()).unwrap_or("cc")
    }

    /// Get extra compiler flags from `CFLAGS`.
    pub fn cflags(&self) -> Vec<String> {
        self.flag_list(CFLAGS)
    }

    /// Get extra linker flags from `LDFLAGS`.
    pub fn ldflags(&self) -> Vec<String> {
        self.flag_list(LDFLAGS)
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> Option<&str> {
        self.get(CONFIG_PATH).filter(|s| !s.is_empty())
    }

    /// Check if debug logging was requested through the environment.
    pub fn debug(&self) -> bool {
        self.is_enabled(DEBUG)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
