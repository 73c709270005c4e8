//! Build pipeline
//!
//! Runs the stages in their fixed order: resolve the library, select the
//! flags, extract the declarations, then compile and link. A failing stage
//! stops the run, so nothing downstream of a missing library is ever
//! attempted.

use crate::env_vars::BuildEnv;
use crate::extensions::{
    BuildArtifact, BuildDescriptor, BuildError, ExtensionBuilder, embedded_source,
};
use crate::headers::{self, HeaderReadError, HeaderSource};
use crate::platform::{Architecture, CompileConfig, Os, select_flags};
use crate::resolver::{self, PackageRegistry, ResolveError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Any stage failure
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Headers(#[from] HeaderReadError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Inputs of one build, with every path already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub library: String,
    pub module_name: String,
    pub sources: Vec<PathBuf>,
    pub headers: Vec<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub preamble_includes: Vec<String>,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
}

/// The stages' shared inputs: process environment, library registry and
/// header reader
#[derive(Debug)]
pub struct Pipeline<R, H> {
    env: BuildEnv,
    registry: R,
    headers: H,
}

impl<R: PackageRegistry, H: HeaderSource> Pipeline<R, H> {
    #[must_use]
    pub fn new(env: BuildEnv, registry: R, headers: H) -> Self {
        Self {
            env,
            registry,
            headers,
        }
    }

    /// Compile and link flags for a target, including `CFLAGS`/`LDFLAGS`
    /// from the environment and the plan's extra arguments, in that order.
    #[must_use]
    pub fn flags(&self, plan: &BuildPlan, arch: &Architecture, os: &Os) -> CompileConfig {
        let compile_extra: Vec<String> = self
            .env
            .cflags()
            .into_iter()
            .chain(plan.extra_compile_args.iter().cloned())
            .collect();
        let link_extra: Vec<String> = self
            .env
            .ldflags()
            .into_iter()
            .chain(plan.extra_link_args.iter().cloned())
            .collect();

        select_flags(arch, os, &self.env).with_extra(&compile_extra, &link_extra)
    }

    /// Run every stage but the build and return the resulting descriptor.
    pub fn assemble(
        &self,
        plan: &BuildPlan,
        arch: &Architecture,
        os: &Os,
    ) -> Result<BuildDescriptor, PipelineError> {
        let library = resolver::resolve(&self.registry, &plan.library)?;
        crate::debug!(
            "resolved {}: libraries={:?}",
            library.name(),
            library.libraries()
        );

        let compile = self.flags(plan, arch, os);
        let declarations = headers::extract(&self.headers, &plan.headers)?;

        Ok(BuildDescriptor::new(
            plan.module_name.clone(),
            embedded_source(plan.preamble_includes.as_slice()),
            plan.sources.clone(),
            plan.include_dirs.clone(),
            compile,
            library,
            declarations,
        ))
    }

    /// Assemble the descriptor and build the module into `out_dir`.
    pub fn build(
        &self,
        plan: &BuildPlan,
        arch: &Architecture,
        builder: &ExtensionBuilder,
        out_dir: &Path,
    ) -> Result<BuildArtifact, PipelineError> {
        let descriptor = self.assemble(plan, arch, builder.os())?;
        Ok(builder.build(&descriptor, out_dir)?)
    }
}
