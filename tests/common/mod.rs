//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary invocation with a controlled environment (via `clair3_build_cmd`)
//! - Test fixture utilities (via `helpers`)

pub(crate) mod helpers;

// Re-export for convenient access
pub(crate) use helpers::clair3_build_cmd;
