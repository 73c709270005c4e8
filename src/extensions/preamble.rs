//! Fixed source and declaration preambles
//!
//! The embedded preamble is a small translation unit that includes the real
//! headers, so the compiler sees full definitions. The handle declarations
//! are prepended to the extracted header declarations; `bam_fset` stays
//! opaque across the FFI boundary.

use crate::headers::BLOCK_SEPARATOR;

/// Opaque handle type and its lifecycle functions
pub const HANDLE_DECLARATIONS: [&str; 3] = [
    "typedef struct { ...; } bam_fset;",
    "bam_fset* create_bam_fset(char* fname, char* fasta_path);",
    "void destroy_bam_fset(bam_fset* fset);",
];

/// Headers included by the embedded preamble, in include order
pub const DEFAULT_PREAMBLE_INCLUDES: [&str; 8] = [
    "kvec.h",
    "khash.h",
    "levenshtein.h",
    "medaka_bamiter.h",
    "medaka_common.h",
    "medaka_khcounter.h",
    "clair3_pileup.h",
    "clair3_full_alignment.h",
];

/// Render the embedded C preamble for `includes`.
#[must_use]
pub fn embedded_source<S: AsRef<str>>(includes: &[S]) -> String {
    includes
        .iter()
        .map(|header| format!("#include \"{}\"\n", header.as_ref()))
        .collect()
}

/// Prepend the handle declarations to an extracted declaration corpus.
#[must_use]
pub fn declaration_set(corpus: &str) -> String {
    let mut set = HANDLE_DECLARATIONS.join(BLOCK_SEPARATOR);
    if !corpus.is_empty() {
        set.push_str(BLOCK_SEPARATOR);
        set.push_str(corpus);
    }
    set
}
