//! C compiler driver
//!
//! Compiles each translation unit to an object file and links the objects
//! into one shared module. It's the equivalent of:
//! ```bash
//! cc -fPIC -Isrc -I/opt/htslib/include -c src/x.c -o x.o -std=c99 -O3 ...
//! cc -shared x.o y.o -L/opt/htslib/lib -lhts -o libclair3.so -Wl,-rpath,...
//! ```

use super::types::BuildDescriptor;
use crate::debug::debug_command;
use crate::env_vars::BuildEnv;
use crate::platform::Os;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;

/// Errors that can occur while building the extension
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Source file not found: {}", .path.display())]
    MissingSource { path: PathBuf },

    #[error("Failed to run {program}: {source}")]
    Toolchain {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Compiling {} failed with exit code: {status}\n{diagnostics}", .source_file.display())]
    CompileFailed {
        source_file: PathBuf,
        status: String,
        diagnostics: String,
    },

    #[error("Linking {module} failed with exit code: {status}\n{diagnostics}")]
    LinkFailed {
        module: String,
        status: String,
        diagnostics: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// C extension compiler
///
/// Runs the C compiler named by `CC` (default `cc`) for every compile and
/// link step.
#[derive(Debug, Clone)]
pub struct CExtensionBuilder {
    /// Compiler executable
    compiler: String,
    /// Target operating system
    os: Os,
    /// Enable verbose output
    verbose: bool,
}

impl CExtensionBuilder {
    /// Create a builder using the compiler from `env`.
    #[must_use]
    pub fn new(env: &BuildEnv, os: Os, verbose: bool) -> Self {
        Self {
            compiler: env.cc().to_string(),
            os,
            verbose,
        }
    }

    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// Compile one translation unit into `object`.
    ///
    /// Returns the compiler's stdout + stderr on success.
    pub fn compile(
        &self,
        descriptor: &BuildDescriptor,
        source: &Path,
        object: &Path,
    ) -> Result<String, BuildError> {
        let mut cmd = Command::new(&self.compiler);
        cmd.args(self.compile_args(descriptor, source, object));

        if self.verbose {
            println!("  Compiling {}", source.display());
        }

        let output = self.run(&mut cmd)?;
        let text = combined_output(&output);
        if !output.status.success() {
            return Err(BuildError::CompileFailed {
                source_file: source.to_path_buf(),
                status: exit_code(&output),
                diagnostics: text,
            });
        }

        Ok(text)
    }

    /// Link `objects` into the shared module at `module_path`.
    pub fn link(
        &self,
        descriptor: &BuildDescriptor,
        objects: &[PathBuf],
        module_path: &Path,
    ) -> Result<String, BuildError> {
        let mut cmd = Command::new(&self.compiler);
        cmd.args(Self::link_args(descriptor, objects, module_path));

        if self.verbose {
            println!("  Linking {}", module_path.display());
        }

        let output = self.run(&mut cmd)?;
        let text = combined_output(&output);
        if !output.status.success() {
            return Err(BuildError::LinkFailed {
                module: descriptor.module_name().to_string(),
                status: exit_code(&output),
                diagnostics: text,
            });
        }

        Ok(text)
    }

    /// Arguments for compiling `source`, in distutils order: position
    /// independence, include dirs, the file itself, then the selected compile
    /// args so they win over anything earlier. The library's macros are
    /// reported in the descriptor but never passed to the compiler.
    fn compile_args(
        &self,
        descriptor: &BuildDescriptor,
        source: &Path,
        object: &Path,
    ) -> Vec<String> {
        let mut args = Vec::new();

        if self.os != Os::Windows {
            args.push("-fPIC".to_string());
        }

        let include_dirs = descriptor
            .include_dirs()
            .iter()
            .chain(descriptor.library().include_dirs());
        for dir in include_dirs {
            args.push(format!("-I{}", dir.display()));
        }

        args.push("-c".to_string());
        args.push(source.display().to_string());
        args.push("-o".to_string());
        args.push(object.display().to_string());
        args.extend(descriptor.compile().compile_args.iter().cloned());

        args
    }

    /// Arguments for linking the module. Library dirs and names follow the
    /// objects so single-pass linkers resolve everything.
    fn link_args(
        descriptor: &BuildDescriptor,
        objects: &[PathBuf],
        module_path: &Path,
    ) -> Vec<String> {
        let mut args = vec!["-shared".to_string()];

        args.extend(objects.iter().map(|o| o.display().to_string()));

        let library = descriptor.library();
        args.extend(library.library_dirs().iter().map(|d| format!("-L{}", d.display())));
        args.extend(library.libraries().iter().map(|l| format!("-l{l}")));

        args.push("-o".to_string());
        args.push(module_path.display().to_string());
        args.extend(descriptor.compile().link_args.iter().cloned());

        args
    }

    fn run(&self, cmd: &mut Command) -> Result<Output, BuildError> {
        debug_command(cmd);
        cmd.output().map_err(|source| BuildError::Toolchain {
            program: self.compiler.clone(),
            source,
        })
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

fn exit_code(output: &Output) -> String {
    output
        .status
        .code()
        .map_or_else(|| "unknown".to_string(), |c| c.to_string())
}
