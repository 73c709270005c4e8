//! Cdef command
//!
//! Print the full declaration set: handle declarations followed by the
//! declarations extracted from the headers.

use super::{PlanArgs, load_config};
use anyhow::Result;
use clair3_build::extensions::declaration_set;
use clair3_build::{BuildEnv, FsHeaderSource, extract};
use std::path::{Path, PathBuf};

/// Print the declaration set for `headers`, or for the configured headers
/// when none are given.
pub(crate) fn run(env: &BuildEnv, config_path: Option<&Path>, headers: &[PathBuf]) -> Result<()> {
    let headers = if headers.is_empty() {
        load_config(env, config_path, &PlanArgs::default())?
            .to_plan()
            .headers
    } else {
        headers.to_vec()
    };

    let corpus = extract(&FsHeaderSource, &headers)?;
    let set = declaration_set(&corpus);
    if set.ends_with('\n') {
        print!("{set}");
    } else {
        println!("{set}");
    }

    Ok(())
}
