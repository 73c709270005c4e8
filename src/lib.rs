//! Clair3 native extension build internals
//!
//! Resolves the htslib build metadata, selects platform compile flags,
//! extracts the FFI declarations from the public headers and builds the
//! `libclair3` module.

/// Library resolved through pkg-config by default
pub const DEFAULT_LIBRARY: &str = "htslib";

/// Name of the built module by default
pub const DEFAULT_MODULE_NAME: &str = "libclair3";

pub mod config;
pub mod debug;
pub mod env_vars;
pub mod extensions;
pub mod headers;
pub mod pipeline;
pub mod platform;
pub mod resolver;

#[cfg(test)]
mod test_utils;

// Re-export common types for convenience
pub use config::Config;
pub use debug::{init_debug, is_debug_enabled};
pub use env_vars::BuildEnv;
pub use extensions::{BuildArtifact, BuildDescriptor, BuildError, ExtensionBuilder};
pub use headers::{FsHeaderSource, HeaderReadError, HeaderSource, extract, strip_directives};
pub use pipeline::{BuildPlan, Pipeline, PipelineError};
pub use platform::{Architecture, CompileConfig, Os, select_flags};
pub use resolver::{LibraryMetadata, PackageRegistry, PkgConfig, ResolveError, resolve};
