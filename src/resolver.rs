//! Native library resolution through `pkg-config`.
//!
//! Looks up one library's include directories, library directories, link
//! names and preprocessor macros, and validates the result before any other
//! stage sees it.

use crate::debug::debug_command;
use crate::env_vars::{BuildEnv, PKG_CONFIG_PATH};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Errors that can occur while resolving a native library
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{library} not found: {reason}. Please install it or set PKG_CONFIG_PATH.")]
    DependencyNotFound { library: String, reason: String },

    #[error("Failed to run {program}: {source}")]
    RegistryUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pkg-config {query} {library} failed: {stderr}")]
    QueryFailed {
        library: String,
        query: &'static str,
        stderr: String,
    },
}

/// A single metadata query against the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    IncludeDirs,
    LibraryDirs,
    Libraries,
    OtherCflags,
}

impl Query {
    /// The `pkg-config` flag answering this query
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::IncludeDirs => "--cflags-only-I",
            Self::LibraryDirs => "--libs-only-L",
            Self::Libraries => "--libs-only-l",
            Self::OtherCflags => "--cflags-only-other",
        }
    }
}

/// Source of library build metadata
pub trait PackageRegistry {
    /// Whether the registry has a record for `library`.
    fn exists(&self, library: &str) -> Result<bool, ResolveError>;

    /// Raw answer to one query. Only called after [`Self::exists`] said yes.
    fn query(&self, library: &str, query: Query) -> Result<String, ResolveError>;
}

impl<R: PackageRegistry + ?Sized> PackageRegistry for &R {
    fn exists(&self, library: &str) -> Result<bool, ResolveError> {
        (**self).exists(library)
    }

    fn query(&self, library: &str, query: Query) -> Result<String, ResolveError> {
        (**self).query(library, query)
    }
}

/// Registry backed by the `pkg-config` executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgConfig {
    /// Executable name or path
    program: String,
    /// Value for `PKG_CONFIG_PATH`; removed from the child env when `None`
    search_path: Option<String>,
}

impl PkgConfig {
    /// Configure from an environment snapshot (`PKG_CONFIG`, `PKG_CONFIG_PATH`).
    #[must_use]
    pub fn from_env(env: &BuildEnv) -> Self {
        Self {
            program: env.pkg_config().to_string(),
            search_path: env.pkg_config_path().map(ToString::to_string),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        match &self.search_path {
            Some(path) => cmd.env(PKG_CONFIG_PATH, path),
            None => cmd.env_remove(PKG_CONFIG_PATH),
        };
        cmd
    }

    fn unavailable(&self, source: std::io::Error) -> ResolveError {
        ResolveError::RegistryUnavailable {
            program: self.program.clone(),
            source,
        }
    }
}

impl PackageRegistry for PkgConfig {
    fn exists(&self, library: &str) -> Result<bool, ResolveError> {
        let mut cmd = self.command();
        cmd.args(["--exists", library]);
        debug_command(&cmd);

        let status = cmd.status().map_err(|e| self.unavailable(e))?;
        Ok(status.success())
    }

    fn query(&self, library: &str, query: Query) -> Result<String, ResolveError> {
        let mut cmd = self.command();
        cmd.args([query.flag(), library]);
        debug_command(&cmd);

        let output = cmd.output().map_err(|e| self.unavailable(e))?;
        if !output.status.success() {
            return Err(ResolveError::QueryFailed {
                library: library.to_string(),
                query: query.flag(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Validated build requirements of one library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryMetadata {
    name: String,
    libraries: Vec<String>,
    library_dirs: Vec<PathBuf>,
    include_dirs: Vec<PathBuf>,
    define_macros: Vec<(String, Option<String>)>,
}

impl LibraryMetadata {
    /// Build metadata, rejecting an empty library set.
    ///
    /// Duplicate library names are dropped; first-seen order is kept since
    /// it is the link order.
    pub fn new(
        name: &str,
        libraries: Vec<String>,
        library_dirs: Vec<PathBuf>,
        include_dirs: Vec<PathBuf>,
        define_macros: Vec<(String, Option<String>)>,
    ) -> Result<Self, ResolveError> {
        let mut unique: Vec<String> = Vec::with_capacity(libraries.len());
        for lib in libraries {
            if !unique.contains(&lib) {
                unique.push(lib);
            }
        }

        if unique.is_empty() {
            return Err(ResolveError::DependencyNotFound {
                library: name.to_string(),
                reason: "registry returned no link libraries".to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            libraries: unique,
            library_dirs,
            include_dirs,
            define_macros,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Link library names, without the `-l` prefix
    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    pub fn library_dirs(&self) -> &[PathBuf] {
        &self.library_dirs
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    /// `-D` macros from the library's compile flags. Informational only: the
    /// builder does not pass them to the compiler.
    pub fn define_macros(&self) -> &[(String, Option<String>)] {
        &self.define_macros
    }
}

/// Resolve a library's build metadata from a registry.
///
/// Fails with [`ResolveError::DependencyNotFound`] when the registry has no
/// record for `library` or reports no link libraries for it.
pub fn resolve(
    registry: &impl PackageRegistry,
    library: &str,
) -> Result<LibraryMetadata, ResolveError> {
    crate::debug!("resolving {library}");

    if !registry.exists(library)? {
        return Err(ResolveError::DependencyNotFound {
            library: library.to_string(),
            reason: "no package metadata registered".to_string(),
        });
    }

    let include_dirs = strip_prefixed(&registry.query(library, Query::IncludeDirs)?, "-I")
        .map(PathBuf::from)
        .collect();
    let library_dirs = strip_prefixed(&registry.query(library, Query::LibraryDirs)?, "-L")
        .map(PathBuf::from)
        .collect();
    let libraries = strip_prefixed(&registry.query(library, Query::Libraries)?, "-l")
        .map(ToString::to_string)
        .collect();
    let define_macros = parse_define_macros(&registry.query(library, Query::OtherCflags)?);

    let metadata = LibraryMetadata::new(
        library,
        libraries,
        library_dirs,
        include_dirs,
        define_macros,
    )?;

    crate::debug!(
        "{library}: libraries={:?} library_dirs={:?} include_dirs={:?}",
        metadata.libraries,
        metadata.library_dirs,
        metadata.include_dirs
    );

    Ok(metadata)
}

// Tokens carrying `prefix`, with the prefix removed
fn strip_prefixed<'a>(output: &'a str, prefix: &'a str) -> impl Iterator<Item = &'a str> {
    output
        .split_whitespace()
        .filter_map(move |token| token.strip_prefix(prefix))
        .filter(|value| !value.is_empty())
}

fn parse_define_macros(output: &str) -> Vec<(String, Option<String>)> {
    strip_prefixed(output, "-D")
        .map(|def| match def.split_once('=') {
            Some((name, value)) => (name.to_string(), Some(value.to_string())),
            None => (def.to_string(), None),
        })
        .collect()
}
