//! Shared test helpers and utilities

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Variables that change what the binary does; cleared for every run
const BUILD_VARS: [&str; 8] = [
    "CONDA_PREFIX",
    "PKG_CONFIG",
    "PKG_CONFIG_PATH",
    "CC",
    "CFLAGS",
    "LDFLAGS",
    "CLAIR3_BUILD_CONFIG",
    "CLAIR3_BUILD_DEBUG",
];

/// Command for the clair3-build binary, run inside `dir` with the build
/// variables cleared and the user config directory pointed into `dir`.
pub(crate) fn clair3_build_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_clair3-build"));
    cmd.current_dir(dir).env("XDG_CONFIG_HOME", dir.join(".config"));
    for var in BUILD_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Print captured output; call before asserting on the status
#[allow(dead_code)]
pub(crate) fn dump(output: &Output) {
    eprintln!("stdout: {}", String::from_utf8_lossy(&output.stdout));
    eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
}

/// Create `native/` with a public header and its implementation, plus a
/// config file building them into `out/`. Returns the config path.
#[allow(dead_code)]
pub(crate) fn create_project(temp_dir: &TempDir, library: &str) -> PathBuf {
    let native = temp_dir.path().join("native");
    fs::create_dir_all(&native).expect("Failed to create native dir");

    fs::write(
        native.join("clair3_pileup.h"),
        "#ifndef CLAIR3_PILEUP_H\n\
         #define CLAIR3_PILEUP_H\n\
         #include <stddef.h>\n\
         size_t pileup_count(size_t n);\n\
         #endif\n",
    )
    .expect("Failed to write header");
    fs::write(
        native.join("clair3_pileup.c"),
        "#include \"clair3_pileup.h\"\nsize_t pileup_count(size_t n) { return n; }\n",
    )
    .expect("Failed to write source");

    let config_path = temp_dir.path().join("clair3-build.toml");
    fs::write(
        &config_path,
        format!(
            "library = \"{library}\"\n\
             src_dir = \"native\"\n\
             sources = [\"clair3_pileup.c\"]\n\
             headers = [\"clair3_pileup.h\"]\n\
             preamble_includes = [\"clair3_pileup.h\"]\n\
             out_dir = \"out\"\n"
        ),
    )
    .expect("Failed to write config");

    config_path
}

/// Write a `.pc` file for `library` linking only libm
#[allow(dead_code)]
pub(crate) fn create_pc_file(dir: &Path, library: &str) {
    fs::write(
        dir.join(format!("{library}.pc")),
        format!(
            "Name: {library}\n\
             Description: test fixture\n\
             Version: 1.0.0\n\
             Cflags: -DCLAIR3_FIXTURE=1\n\
             Libs: -lm\n"
        ),
    )
    .expect("Failed to write .pc file");
}

#[allow(dead_code)]
pub(crate) fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success())
}
