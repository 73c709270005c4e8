//! Native extension building
//!
//! Compiles the extension sources, a generated preamble translation unit and
//! the resolved library into one loadable module, and writes the declarations
//! that module exposes next to it.
//!
//! - [`types`]: the build descriptor and artifact
//! - [`preamble`]: fixed C preamble and handle declarations
//! - [`c_extension`]: compile and link steps
//! - [`builder`]: staging, stale-module removal and installation

pub mod builder;
pub mod c_extension;
pub mod preamble;
pub mod types;

pub use builder::ExtensionBuilder;
pub use c_extension::{BuildError, CExtensionBuilder};
pub use preamble::{DEFAULT_PREAMBLE_INCLUDES, HANDLE_DECLARATIONS, declaration_set, embedded_source};
pub use types::{BuildArtifact, BuildDescriptor};
