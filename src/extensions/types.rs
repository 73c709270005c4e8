//! Extension build inputs and outputs
//!
//! A [`BuildDescriptor`] is everything the builder needs, assembled once
//! from the resolver, flag selector and header extractor. A
//! [`BuildArtifact`] describes what a successful build left on disk.

use super::preamble;
use crate::platform::CompileConfig;
use crate::resolver::LibraryMetadata;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Complete, immutable description of one extension build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildDescriptor {
    module_name: String,
    /// C source compiled into the module ahead of the real sources
    embedded_preamble: String,
    sources: Vec<PathBuf>,
    /// Project include directories, searched before the library's
    include_dirs: Vec<PathBuf>,
    compile: CompileConfig,
    library: LibraryMetadata,
    /// Declarations extracted from the public headers
    declarations: String,
}

impl BuildDescriptor {
    #[must_use]
    pub fn new(
        module_name: impl Into<String>,
        embedded_preamble: impl Into<String>,
        sources: Vec<PathBuf>,
        include_dirs: Vec<PathBuf>,
        compile: CompileConfig,
        library: LibraryMetadata,
        declarations: impl Into<String>,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            embedded_preamble: embedded_preamble.into(),
            sources,
            include_dirs,
            compile,
            library,
            declarations: declarations.into(),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn embedded_preamble(&self) -> &str {
        &self.embedded_preamble
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn include_dirs(&self) -> &[PathBuf] {
        &self.include_dirs
    }

    pub fn compile(&self) -> &CompileConfig {
        &self.compile
    }

    pub fn library(&self) -> &LibraryMetadata {
        &self.library
    }

    /// Extracted header declarations only
    pub fn declarations(&self) -> &str {
        &self.declarations
    }

    /// Every symbol the module exposes: the handle declarations followed by
    /// the extracted header declarations.
    #[must_use]
    pub fn exposed_declarations(&self) -> String {
        preamble::declaration_set(&self.declarations)
    }

    /// File name of the generated preamble translation unit
    #[must_use]
    pub fn preamble_file_name(&self) -> String {
        format!("_{}.c", self.module_name)
    }

    /// File name of the declaration file written next to the module
    #[must_use]
    pub fn declarations_file_name(&self) -> String {
        format!("{}.cdef", self.module_name)
    }
}

/// Result of a successful extension build
#[derive(Debug)]
pub struct BuildArtifact {
    pub module_name: String,

    /// The loadable module
    pub module_path: PathBuf,

    /// Declarations exposed by the module
    pub declarations_path: PathBuf,

    /// Build duration
    pub duration: Duration,

    /// Toolchain output (stdout + stderr of every step)
    pub output: String,
}
