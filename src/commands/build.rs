//! Build command
//!
//! Resolve the library, select flags, extract declarations and build the
//! extension module into the output directory.

use super::{PlanArgs, load_config};
use anyhow::{Context, Result};
use clair3_build::{BuildEnv, ExtensionBuilder, FsHeaderSource, Os, Pipeline, PkgConfig};
use std::path::Path;

/// Build the extension module.
///
/// `out_dir` overrides the configured output directory.
pub(crate) fn run(
    env: &BuildEnv,
    config_path: Option<&Path>,
    overrides: &PlanArgs,
    out_dir: Option<&Path>,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let config = load_config(env, config_path, overrides)?;
    let out_dir = out_dir.map_or_else(|| config.out_dir(), Path::to_path_buf);
    let plan = config.to_plan();

    let pipeline = Pipeline::new(env.clone(), PkgConfig::from_env(env), FsHeaderSource);
    let builder = ExtensionBuilder::new(env, Os::host(), verbose, quiet);

    let artifact = pipeline
        .build(&plan, &overrides.architecture(), &builder, &out_dir)
        .with_context(|| format!("Failed to build {}", plan.module_name))?;

    if verbose && !artifact.output.trim().is_empty() {
        println!("{}", artifact.output.trim_end());
    }

    if !quiet {
        println!(
            "Built {} -> {} ({:.2}s)",
            artifact.module_name,
            artifact.module_path.display(),
            artifact.duration.as_secs_f64()
        );
        println!("Declarations: {}", artifact.declarations_path.display());
    }

    Ok(())
}
