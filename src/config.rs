//! Configuration file management
//!
//! Reads the TOML build configuration from an explicit path, the
//! `CLAIR3_BUILD_CONFIG` variable, the project directory or the user config
//! directory. Every key is optional; missing keys fall back to the Clair3
//! source layout.

use crate::env_vars::BuildEnv;
use crate::extensions::DEFAULT_PREAMBLE_INCLUDES;
use crate::pipeline::BuildPlan;
use crate::{DEFAULT_LIBRARY, DEFAULT_MODULE_NAME};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "clair3-build.toml";

/// Native sources compiled into the extension
pub const DEFAULT_SOURCES: [&str; 6] = [
    "levenshtein.c",
    "medaka_bamiter.c",
    "medaka_common.c",
    "medaka_khcounter.c",
    "clair3_pileup.c",
    "clair3_full_alignment.c",
];

/// Public headers whose declarations are exposed
pub const DEFAULT_HEADERS: [&str; 2] = ["clair3_pileup.h", "clair3_full_alignment.h"];

/// Build configuration loaded from TOML files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Library to resolve through pkg-config
    pub library: String,

    /// Directory holding the native sources and headers
    pub src_dir: PathBuf,

    /// Sources, relative to `src_dir` unless absolute
    pub sources: Vec<PathBuf>,

    /// Headers to extract declarations from, relative to `src_dir` unless absolute
    pub headers: Vec<PathBuf>,

    /// Headers the generated preamble includes
    pub preamble_includes: Vec<String>,

    /// Name of the loadable module
    pub module_name: String,

    /// Where the module is installed
    pub out_dir: PathBuf,

    /// Appended to the selected compile flags
    pub extra_compile_args: Vec<String>,

    /// Appended to the selected link flags
    pub extra_link_args: Vec<String>,

    /// Directory of the file this was loaded from; relative `src_dir` and
    /// `out_dir` resolve against it
    #[serde(skip)]
    base_dir: Option<PathBuf>,

    /// Source directory given on the command line; used as is, relative to
    /// the working directory
    #[serde(skip)]
    src_dir_override: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: DEFAULT_LIBRARY.to_string(),
            src_dir: Path::new("Clair3").join("src"),
            sources: DEFAULT_SOURCES.iter().map(PathBuf::from).collect(),
            headers: DEFAULT_HEADERS.iter().map(PathBuf::from).collect(),
            preamble_includes: DEFAULT_PREAMBLE_INCLUDES
                .iter()
                .map(ToString::to_string)
                .collect(),
            module_name: DEFAULT_MODULE_NAME.to_string(),
            out_dir: PathBuf::from("build"),
            extra_compile_args: Vec::new(),
            extra_link_args: Vec::new(),
            base_dir: None,
            src_dir_override: None,
        }
    }
}

impl Config {
    /// Load configuration.
    /// Priority: `CLAIR3_BUILD_CONFIG` -> ./clair3-build.toml ->
    /// ~/.config/clair3-build/config.toml -> defaults
    pub fn load(env: &BuildEnv) -> Result<Self> {
        Self::load_with_options(None, env)
    }

    /// Load configuration, preferring `custom_path` when given.
    ///
    /// An explicitly named file (argument or `CLAIR3_BUILD_CONFIG`) must
    /// exist. Discovered files must parse; absent ones are skipped.
    pub fn load_with_options(custom_path: Option<&Path>, env: &BuildEnv) -> Result<Self> {
        if let Some(path) = custom_path {
            return Self::load_from(path);
        }

        if let Some(path) = env.config_path() {
            return Self::load_from(path);
        }

        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::load_from(local);
        }

        if let Some(config_dir) = Self::user_config_dir(env) {
            let config_path = config_dir.join("config.toml");
            if config_path.is_file() {
                return Self::load_from(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Load and parse one configuration file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);

        crate::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn user_config_dir(env: &BuildEnv) -> Option<PathBuf> {
        // Check XDG_CONFIG_HOME first
        if let Some(xdg_config) = env.get("XDG_CONFIG_HOME").filter(|s| !s.is_empty()) {
            return Some(PathBuf::from(xdg_config).join("clair3-build"));
        }

        // Fall back to ~/.config/clair3-build
        dirs::home_dir().map(|home| home.join(".config").join("clair3-build"))
    }

    fn relative_to_base(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Replace the source directory with one that is not relative to the
    /// config file.
    pub fn override_src_dir(&mut self, dir: PathBuf) {
        self.src_dir_override = Some(dir);
    }

    /// Source directory: the override if set, otherwise `src_dir` resolved
    /// against the config file's directory
    #[must_use]
    pub fn src_dir(&self) -> PathBuf {
        self.src_dir_override
            .clone()
            .unwrap_or_else(|| self.relative_to_base(&self.src_dir))
    }

    /// Output directory, resolved against the config file's directory
    #[must_use]
    pub fn out_dir(&self) -> PathBuf {
        self.relative_to_base(&self.out_dir)
    }

    /// Resolve a source or header path against `src_dir`.
    #[must_use]
    pub fn source_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.src_dir().join(path)
        }
    }

    /// Turn the configuration into the inputs of one pipeline run.
    #[must_use]
    pub fn to_plan(&self) -> BuildPlan {
        BuildPlan {
            library: self.library.clone(),
            module_name: self.module_name.clone(),
            sources: self.sources.iter().map(|s| self.source_path(s)).collect(),
            headers: self.headers.iter().map(|h| self.source_path(h)).collect(),
            include_dirs: vec![self.src_dir()],
            preamble_includes: self.preamble_includes.clone(),
            extra_compile_args: self.extra_compile_args.clone(),
            extra_link_args: self.extra_link_args.clone(),
        }
    }
}
