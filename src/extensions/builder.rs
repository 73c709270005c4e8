//! Extension Builder Orchestration
//!
//! Turns a [`BuildDescriptor`] into a loadable module. Everything is built in
//! a staging directory inside the output directory; the module and its
//! declaration file are moved into place only after every compile and link
//! step succeeded. A module and declaration file left over from an earlier
//! build are removed first, so a failed build leaves neither behind.

use super::c_extension::{BuildError, CExtensionBuilder};
use super::types::{BuildArtifact, BuildDescriptor};
use crate::env_vars::BuildEnv;
use crate::platform::Os;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Extension builder coordinator
#[derive(Debug)]
pub struct ExtensionBuilder {
    /// Compiler driver
    c_builder: CExtensionBuilder,
    /// Target operating system (decides the module suffix)
    os: Os,
    /// Enable verbose output
    verbose: bool,
    /// Suppress progress output
    quiet: bool,
}

impl ExtensionBuilder {
    /// Create a new extension builder.
    #[must_use]
    pub fn new(env: &BuildEnv, os: Os, verbose: bool, quiet: bool) -> Self {
        Self {
            c_builder: CExtensionBuilder::new(env, os.clone(), verbose),
            os,
            verbose,
            quiet,
        }
    }

    /// Target operating system
    #[must_use]
    pub const fn os(&self) -> &Os {
        &self.os
    }

    /// File name of the loadable module, e.g. `libclair3.so`
    #[must_use]
    pub fn module_file_name(&self, descriptor: &BuildDescriptor) -> String {
        format!(
            "{}.{}",
            descriptor.module_name(),
            self.os.extension_suffix()
        )
    }

    /// Path the module for `descriptor` is installed at inside `out_dir`.
    #[must_use]
    pub fn module_path(&self, descriptor: &BuildDescriptor, out_dir: &Path) -> PathBuf {
        out_dir.join(self.module_file_name(descriptor))
    }

    /// Build the extension described by `descriptor` into `out_dir`.
    ///
    /// Steps:
    /// 1. Check every source exists (before anything is spawned)
    /// 2. Remove a stale module and declaration file from `out_dir`
    /// 3. Write the embedded preamble as a generated translation unit
    /// 4. Compile the preamble and every source
    /// 5. Link the module and write the declaration file
    /// 6. Move both into `out_dir`
    pub fn build(
        &self,
        descriptor: &BuildDescriptor,
        out_dir: &Path,
    ) -> Result<BuildArtifact, BuildError> {
        let start_time = Instant::now();
        let mut output = String::new();

        if let Some(missing) = descriptor.sources().iter().find(|s| !s.is_file()) {
            return Err(BuildError::MissingSource {
                path: missing.clone(),
            });
        }

        fs::create_dir_all(out_dir).map_err(|e| {
            BuildError::io(
                format!("Failed to create output directory {}", out_dir.display()),
                e,
            )
        })?;

        let module_path = self.module_path(descriptor, out_dir);
        let declarations_path = out_dir.join(descriptor.declarations_file_name());
        remove_if_present(&module_path)?;
        remove_if_present(&declarations_path)?;

        if self.verbose {
            println!("Building {}", descriptor.module_name());
            println!("  compiler: {}", self.c_builder.compiler());
            println!("  out_dir:  {}", out_dir.display());
        }

        let staging = tempfile::Builder::new()
            .prefix(".clair3-build-")
            .tempdir_in(out_dir)
            .map_err(|e| BuildError::io("Failed to create staging directory", e))?;
        crate::debug!("staging in {}", staging.path().display());

        let preamble_path = staging.path().join(descriptor.preamble_file_name());
        fs::write(&preamble_path, descriptor.embedded_preamble()).map_err(|e| {
            BuildError::io(
                format!("Failed to write {}", preamble_path.display()),
                e,
            )
        })?;

        let units: Vec<&Path> = std::iter::once(preamble_path.as_path())
            .chain(descriptor.sources().iter().map(PathBuf::as_path))
            .collect();

        let progress = self.progress_bar(units.len() as u64 + 1);
        let mut objects = Vec::with_capacity(units.len());

        for (index, unit) in units.iter().enumerate() {
            if let Some(pb) = &progress {
                pb.set_message(display_name(unit));
            }

            let object = staging.path().join(object_name(index, unit));
            let result = self.c_builder.compile(descriptor, unit, &object);
            let compiled = match result {
                Ok(text) => text,
                Err(e) => {
                    if let Some(pb) = &progress {
                        pb.abandon_with_message("compile failed");
                    }
                    return Err(e);
                }
            };
            output.push_str(&compiled);
            objects.push(object);

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        let staged_module = staging.path().join(self.module_file_name(descriptor));

        if let Some(pb) = &progress {
            pb.set_message("linking");
        }
        match self.c_builder.link(descriptor, &objects, &staged_module) {
            Ok(text) => output.push_str(&text),
            Err(e) => {
                if let Some(pb) = &progress {
                    pb.abandon_with_message("link failed");
                }
                return Err(e);
            }
        }

        let staged_declarations = staging.path().join(descriptor.declarations_file_name());
        fs::write(&staged_declarations, descriptor.exposed_declarations()).map_err(|e| {
            BuildError::io(
                format!("Failed to write {}", staged_declarations.display()),
                e,
            )
        })?;

        // Module last: it is only visible once its declarations are in place
        promote(&staged_declarations, &declarations_path)?;
        promote(&staged_module, &module_path)?;

        if let Some(pb) = progress {
            pb.inc(1);
            pb.finish_with_message("done");
        }

        if self.verbose {
            println!(
                "  Installed {} -> {}",
                descriptor.module_name(),
                module_path.display()
            );
        }

        Ok(BuildArtifact {
            module_name: descriptor.module_name().to_string(),
            module_path,
            declarations_path,
            duration: start_time.elapsed(),
            output,
        })
    }

    fn progress_bar(&self, steps: u64) -> Option<ProgressBar> {
        if self.verbose || self.quiet {
            return None;
        }

        let progress = ProgressBar::new(steps);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }
        Some(progress)
    }
}

fn remove_if_present(path: &Path) -> Result<(), BuildError> {
    match fs::remove_file(path) {
        Ok(()) => {
            crate::debug!("removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::io(
            format!("Failed to remove stale {}", path.display()),
            e,
        )),
    }
}

fn promote(staged: &Path, target: &Path) -> Result<(), BuildError> {
    remove_if_present(target)?;
    fs::rename(staged, target).map_err(|e| {
        BuildError::io(
            format!("Failed to move {} to {}", staged.display(), target.display()),
            e,
        )
    })
}

// Indexed so sources sharing a file stem in different directories don't collide
fn object_name(index: usize, unit: &Path) -> String {
    let stem = unit
        .file_stem()
        .map_or_else(|| "unit".into(), |s| s.to_string_lossy());
    format!("{index:02}-{stem}.o")
}

fn display_name(unit: &Path) -> String {
    unit.file_name()
        .map_or_else(|| unit.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_vars::CC;
    use crate::platform::CompileConfig;
    use crate::resolver::LibraryMetadata;
    use std::process::Command;
    use tempfile::TempDir;

    fn descriptor(sources: Vec<PathBuf>, include_dirs: Vec<PathBuf>, library: &str) -> BuildDescriptor {
        let library =
            LibraryMetadata::new("m", vec![library.to_string()], Vec::new(), Vec::new(), Vec::new())
                .unwrap();
        BuildDescriptor::new(
            "libclair3",
            "#include \"pileup.h\"\n",
            sources,
            include_dirs,
            CompileConfig {
                compile_args: vec!["-std=c99".to_string(), "-O3".to_string()],
                link_args: Vec::new(),
            },
            library,
            "int pileup_count(int n);\n",
        )
    }

    fn compiler_available() -> bool {
        Command::new("cc").arg("--version").output().is_ok_and(|o| o.status.success())
    }

    fn write_project(dir: &Path, body: &str) -> PathBuf {
        fs::write(dir.join("pileup.h"), "#pragma once\nint pileup_count(int n);\n").unwrap();
        let source = dir.join("pileup.c");
        fs::write(&source, body).unwrap();
        source
    }

    #[test]
    fn object_names_are_indexed() {
        assert_eq!(object_name(0, Path::new("/x/_libclair3.c")), "00-_libclair3.o");
        assert_eq!(object_name(3, Path::new("a/levenshtein.c")), "03-levenshtein.o");
    }

    #[test]
    fn module_path_uses_os_suffix() {
        let d = descriptor(Vec::new(), Vec::new(), "m");
        let linux = ExtensionBuilder::new(&BuildEnv::default(), Os::Linux, false, true);
        let windows = ExtensionBuilder::new(&BuildEnv::default(), Os::Windows, false, true);
        assert_eq!(linux.module_path(&d, Path::new("out")), Path::new("out/libclair3.so"));
        assert_eq!(windows.module_path(&d, Path::new("out")), Path::new("out/libclair3.dll"));
    }

    #[test]
    fn missing_source_fails_without_module() {
        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("build");
        let present = write_project(temp.path(), "int pileup_count(int n) { return n; }\n");
        let missing = temp.path().join("medaka_bamiter.c");
        let d = descriptor(vec![present, missing.clone()], vec![temp.path().to_path_buf()], "m");

        let builder = ExtensionBuilder::new(&BuildEnv::default(), Os::Linux, false, true);
        let err = builder.build(&d, &out_dir).unwrap_err();

        assert!(matches!(err, BuildError::MissingSource { ref path } if *path == missing));
        assert!(!builder.module_path(&d, &out_dir).exists());
    }

    #[test]
    fn missing_compiler_leaves_no_module() {
        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("build");
        let source = write_project(temp.path(), "int pileup_count(int n) { return n; }\n");
        let d = descriptor(vec![source], vec![temp.path().to_path_buf()], "m");

        let env = BuildEnv::default().with(CC, "/nonexistent/clair3-cc");
        let builder = ExtensionBuilder::new(&env, Os::Linux, false, true);

        // leftovers from an earlier successful build
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(builder.module_path(&d, &out_dir), b"old module").unwrap();
        fs::write(out_dir.join(d.declarations_file_name()), "int old(void);\n").unwrap();

        let err = builder.build(&d, &out_dir).unwrap_err();

        assert!(matches!(err, BuildError::Toolchain { .. }));
        assert!(!builder.module_path(&d, &out_dir).exists());
        assert!(!out_dir.join(d.declarations_file_name()).exists());
        // staging directory is cleaned up
        assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
    }

    #[test]
    fn builds_module_and_declarations() {
        if !compiler_available() {
            return;
        }

        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("build");
        let source = write_project(temp.path(), "#include \"pileup.h\"\nint pileup_count(int n) { return n * 2; }\n");
        let d = descriptor(vec![source], vec![temp.path().to_path_buf()], "m");

        let builder = ExtensionBuilder::new(&BuildEnv::default(), Os::host(), false, true);
        let artifact = builder.build(&d, &out_dir).unwrap();

        assert!(artifact.module_path.is_file());
        assert_eq!(artifact.module_path, builder.module_path(&d, &out_dir));
        let cdef = fs::read_to_string(&artifact.declarations_path).unwrap();
        assert!(cdef.starts_with("typedef struct { ...; } bam_fset;"));
        assert!(cdef.ends_with("int pileup_count(int n);\n"));
    }

    #[test]
    fn compile_error_removes_stale_module() {
        if !compiler_available() {
            return;
        }

        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("build");
        fs::create_dir_all(&out_dir).unwrap();

        let builder = ExtensionBuilder::new(&BuildEnv::default(), Os::host(), false, true);
        let source = write_project(temp.path(), "int pileup_count(int n) { return n +; }\n");
        let d = descriptor(vec![source], vec![temp.path().to_path_buf()], "m");

        let stale = builder.module_path(&d, &out_dir);
        fs::write(&stale, b"old module").unwrap();

        let err = builder.build(&d, &out_dir).unwrap_err();
        assert!(matches!(err, BuildError::CompileFailed { .. }));
        assert!(!err.to_string().is_empty());
        assert!(!stale.exists());
    }

    #[test]
    fn link_error_is_reported() {
        if !compiler_available() {
            return;
        }

        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("build");
        let source = write_project(temp.path(), "int pileup_count(int n) { return n; }\n");
        let d = descriptor(vec![source], vec![temp.path().to_path_buf()], "clair3nosuchlibrary");

        let builder = ExtensionBuilder::new(&BuildEnv::default(), Os::host(), false, true);
        let err = builder.build(&d, &out_dir).unwrap_err();

        assert!(matches!(err, BuildError::LinkFailed { .. }));
        assert!(!builder.module_path(&d, &out_dir).exists());
    }
}
