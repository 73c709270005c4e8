//! Descriptor command
//!
//! Run every stage up to the build and print the resulting descriptor as JSON

use super::{PlanArgs, load_config, parse_or_host};
use anyhow::{Context, Result};
use clair3_build::{BuildEnv, FsHeaderSource, Os, Pipeline, PkgConfig};
use std::path::Path;

/// Print the build descriptor for the configured plan.
pub(crate) fn run(
    env: &BuildEnv,
    config_path: Option<&Path>,
    overrides: &PlanArgs,
    os: Option<&str>,
) -> Result<()> {
    let config = load_config(env, config_path, overrides)?;
    let plan = config.to_plan();
    let os = parse_or_host(os, Os::parse, Os::host);

    let pipeline = Pipeline::new(env.clone(), PkgConfig::from_env(env), FsHeaderSource);
    let descriptor = pipeline.assemble(&plan, &overrides.architecture(), &os)?;

    let json =
        serde_json::to_string_pretty(&descriptor).context("Failed to serialize build descriptor")?;
    println!("{json}");

    Ok(())
}
