//! Platform detection and compiler flag selection
//!
//! Maps the CPU architecture and operating system (`uname -m` / `uname -s`
//! style names, or detected from the running host) onto the compile and link
//! arguments the extension is built with.

use crate::env_vars::BuildEnv;
use serde::Serialize;
use std::env;
use std::fmt;

/// Strict C99, always passed first.
pub const C99_FLAG: &str = "-std=c99";
/// Optimization level, always passed second.
pub const OPT_FLAG: &str = "-O3";
/// Enables NEON on 64-bit ARM outside of macOS.
pub const ARM_SIMD_FLAG: &str = "-march=armv8-a+simd";
/// Tuning for every non-ARM architecture.
pub const HASWELL_TUNE_FLAG: &str = "-mtune=haswell";

/// CPU architecture
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Architecture {
    Aarch64,
    Arm64,
    X86_64,
    X86,
    /// Anything else, kept verbatim. Treated like x86 for flag selection.
    Other(String),
}

impl Architecture {
    /// Parse an architecture name.
    ///
    /// The 64-bit ARM names only match in lower case, so `ARM64` (as Windows
    /// reports it) takes the default branch. Other names are case-insensitive.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        match name {
            "aarch64" => Self::Aarch64,
            "arm64" => Self::Arm64,
            _ => match name.to_lowercase().as_str() {
                "x86_64" | "amd64" | "x64" => Self::X86_64,
                "x86" | "i386" | "i686" => Self::X86,
                _ => Self::Other(name.to_string()),
            },
        }
    }

    /// Architecture of the running host.
    #[must_use]
    pub fn host() -> Self {
        Self::parse(env::consts::ARCH)
    }

    /// Whether this is 64-bit ARM under either of its names.
    #[must_use]
    #[inline]
    pub const fn is_arm64(&self) -> bool {
        matches!(self, Self::Aarch64 | Self::Arm64)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Aarch64 => "aarch64",
            Self::Arm64 => "arm64",
            Self::X86_64 => "x86_64",
            Self::X86 => "x86",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    Linux,
    Windows,
    Other(String),
}

impl Os {
    /// Parse an OS name (case-insensitive). Accepts both `Darwin` and Rust's
    /// `macos`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "darwin" | "macos" => Self::Darwin,
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    /// Operating system of the running host.
    #[must_use]
    pub fn host() -> Self {
        Self::parse(env::consts::OS)
    }

    /// File suffix of a loadable extension module on this OS.
    #[must_use]
    pub const fn extension_suffix(&self) -> &'static str {
        match self {
            Self::Windows => "dll",
            Self::Darwin | Self::Linux | Self::Other(_) => "so",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Darwin => "Darwin",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler and linker arguments for one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompileConfig {
    pub compile_args: Vec<String>,
    pub link_args: Vec<String>,
}

impl CompileConfig {
    /// Return a new config with forwarded flags appended after the selected
    /// ones.
    #[must_use]
    pub fn with_extra(&self, compile: &[String], link: &[String]) -> Self {
        Self {
            compile_args: self.compile_args.iter().chain(compile).cloned().collect(),
            link_args: self.link_args.iter().chain(link).cloned().collect(),
        }
    }
}

/// Select compile and link flags for a platform.
///
/// 64-bit ARM gets the NEON flag except on Darwin, where the toolchain
/// already targets the host CPU. Every other architecture gets Haswell tuning
/// plus, inside a Conda environment, an rpath to `$CONDA_PREFIX/lib`.
#[must_use]
pub fn select_flags(arch: &Architecture, os: &Os, env: &BuildEnv) -> CompileConfig {
    let mut compile_args = vec![C99_FLAG.to_string(), OPT_FLAG.to_string()];
    let mut link_args = Vec::new();

    match (arch.is_arm64(), os) {
        (true, Os::Darwin) => {}
        (true, _) => compile_args.push(ARM_SIMD_FLAG.to_string()),
        (false, _) => {
            compile_args.push(HASWELL_TUNE_FLAG.to_string());
            if let Some(prefix) = env.conda_prefix() {
                link_args.push(rpath_flag(prefix));
            }
        }
    }

    CompileConfig {
        compile_args,
        link_args,
    }
}

/// Linker flag embedding `<prefix>/lib` as a runtime search path.
#[must_use]
pub fn rpath_flag(prefix: &str) -> String {
    format!("-Wl,-rpath,{prefix}/lib")
}
