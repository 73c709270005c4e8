//! Flags command
//!
//! Display the compile and link flags selected for a platform

use super::parse_or_host;
use anyhow::{Context, Result};
use clair3_build::{Architecture, BuildEnv, CompileConfig, Os, select_flags};

/// Print the flags selected for `arch`/`os` (host when omitted).
pub(crate) fn run(env: &BuildEnv, arch: Option<&str>, os: Option<&str>, json: bool) -> Result<()> {
    let arch = parse_or_host(arch, Architecture::parse, Architecture::host);
    let os = parse_or_host(os, Os::parse, Os::host);
    let flags = select_flags(&arch, &os, env);

    if json {
        let text = serde_json::to_string_pretty(&flags).context("Failed to serialize flags")?;
        println!("{text}");
    } else {
        print!("{}", render(&arch, &os, &flags));
    }

    Ok(())
}

fn render(arch: &Architecture, os: &Os, flags: &CompileConfig) -> String {
    format!(
        "Platform:     {arch}-{os}\n\
         Compile args: {}\n\
         Link args:    {}\n",
        flags.compile_args.join(" "),
        flags.link_args.join(" ")
    )
}
