//! Subcommand implementations

pub(crate) mod build;
pub(crate) mod cdef;
pub(crate) mod completion;
pub(crate) mod descriptor;
pub(crate) mod flags;

use anyhow::Result;
use clair3_build::{Architecture, BuildEnv, Config};
use clap::Args;
use std::path::{Path, PathBuf};

/// Build inputs that override the configuration file
#[derive(Debug, Default, Args)]
pub(crate) struct PlanArgs {
    /// Library to resolve through pkg-config
    #[arg(long)]
    pub(crate) library: Option<String>,

    /// Directory holding the native sources and headers
    #[arg(long)]
    pub(crate) src_dir: Option<PathBuf>,

    /// Name of the built module
    #[arg(long)]
    pub(crate) module_name: Option<String>,

    /// Architecture to select flags for; defaults to the host
    #[arg(long)]
    pub(crate) arch: Option<String>,

    /// Extra compiler flag (repeatable)
    #[arg(long = "cflag", value_name = "FLAG", allow_hyphen_values = true)]
    pub(crate) cflags: Vec<String>,

    /// Extra linker flag (repeatable)
    #[arg(long = "ldflag", value_name = "FLAG", allow_hyphen_values = true)]
    pub(crate) ldflags: Vec<String>,
}

impl PlanArgs {
    /// Apply the overrides; flags are appended after the configured extras.
    pub(crate) fn apply(&self, config: &mut Config) {
        if let Some(library) = &self.library {
            config.library.clone_from(library);
        }
        if let Some(src_dir) = &self.src_dir {
            config.override_src_dir(src_dir.clone());
        }
        if let Some(module_name) = &self.module_name {
            config.module_name.clone_from(module_name);
        }
        config.extra_compile_args.extend(self.cflags.iter().cloned());
        config.extra_link_args.extend(self.ldflags.iter().cloned());
    }

    pub(crate) fn architecture(&self) -> Architecture {
        parse_or_host(self.arch.as_deref(), Architecture::parse, Architecture::host)
    }
}

/// Load the configuration and apply command-line overrides.
pub(crate) fn load_config(
    env: &BuildEnv,
    config_path: Option<&Path>,
    overrides: &PlanArgs,
) -> Result<Config> {
    let mut config = Config::load_with_options(config_path, env)?;
    overrides.apply(&mut config);
    Ok(config)
}

pub(crate) fn parse_or_host<T>(
    name: Option<&str>,
    parse: impl FnOnce(&str) -> T,
    host: impl FnOnce() -> T,
) -> T {
    name.map_or_else(host, parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_and_append() {
        let mut config = Config::default();
        config.extra_compile_args = vec!["-g".to_string()];
        let args = PlanArgs {
            library: Some("htslib-dev".to_string()),
            src_dir: Some(PathBuf::from("native")),
            cflags: vec!["-Wall".to_string()],
            ldflags: vec!["-Wl,--as-needed".to_string()],
            ..PlanArgs::default()
        };

        args.apply(&mut config);

        assert_eq!(config.library, "htslib-dev");
        assert_eq!(config.src_dir(), PathBuf::from("native"));
        assert_eq!(config.module_name, "libclair3");
        assert_eq!(config.extra_compile_args, ["-g", "-Wall"]);
        assert_eq!(config.extra_link_args, ["-Wl,--as-needed"]);
    }

    #[test]
    fn src_dir_override_ignores_config_location() {
        let temp = tempfile::TempDir::new().unwrap();
        let sub = temp.path().join("sub");
        std::fs::create_dir_all(&sub).unwrap();
        let config_path = sub.join("cfg.toml");
        std::fs::write(&config_path, "src_dir = \"from-config\"\n").unwrap();

        let args = PlanArgs {
            src_dir: Some(PathBuf::from("native")),
            ..PlanArgs::default()
        };
        let config = load_config(&BuildEnv::default(), Some(&config_path), &args).unwrap();

        assert_eq!(config.src_dir(), PathBuf::from("native"));
        assert_eq!(
            config.to_plan().sources.first(),
            Some(&PathBuf::from("native").join("levenshtein.c"))
        );
        // the config file's own paths still resolve next to it
        assert_eq!(config.out_dir(), sub.join("build"));
    }

    #[test]
    fn arch_defaults_to_host() {
        assert_eq!(PlanArgs::default().architecture(), Architecture::host());
        let args = PlanArgs {
            arch: Some("aarch64".to_string()),
            ..PlanArgs::default()
        };
        assert_eq!(args.architecture(), Architecture::Aarch64);
    }
}
