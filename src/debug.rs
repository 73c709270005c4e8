//! Debug logging utilities
//!
//! Debug output is enabled by the global `--debug` flag (or
//! `CLAIR3_BUILD_DEBUG`). When disabled, nothing is formatted or written.

use std::process::Command;
use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Initialize debug mode. Only the first call has any effect.
pub fn init_debug(enabled: bool) {
    let _ = DEBUG_ENABLED.set(enabled);
}

/// Check if debug mode is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.get().copied().unwrap_or(false)
}

/// Log an external command line before it is spawned.
///
/// Arguments are shown space-separated; environment overrides set on the
/// command are listed after it.
pub fn debug_command(cmd: &Command) {
    if !is_debug_enabled() {
        return;
    }

    let mut line = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }

    let overrides: Vec<String> = cmd
        .get_envs()
        .map(|(key, value)| {
            value.map_or_else(
                || format!("-{}", key.to_string_lossy()),
                |v| format!("{}={}", key.to_string_lossy(), v.to_string_lossy()),
            )
        })
        .collect();

    if overrides.is_empty() {
        eprintln!("[DEBUG] exec: {line}");
    } else {
        eprintln!("[DEBUG] exec: {line} (env: {})", overrides.join(" "));
    }
}

/// Macro for convenient debug logging
///
/// Usage: `debug!("message with {}", variable)`
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if $crate::debug::is_debug_enabled() {
            eprintln!("[DEBUG] {}", format_args!($($arg)*));
        }
    };
}
