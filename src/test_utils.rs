//! Shared test utilities
//!
//! Fixtures used by more than one module's tests: an in-memory package
//! registry, a header source that records reads, and a minimal native
//! project on disk.

pub(crate) mod fixtures {
    use crate::headers::HeaderSource;
    use crate::resolver::{PackageRegistry, Query, ResolveError};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Registry answering from a fixed table
    #[derive(Debug, Default)]
    pub(crate) struct StaticRegistry {
        records: HashMap<String, HashMap<Query, String>>,
    }

    impl StaticRegistry {
        pub(crate) fn with(mut self, library: &str, answers: &[(Query, &str)]) -> Self {
            self.records.insert(
                library.to_string(),
                answers
                    .iter()
                    .map(|(q, a)| (*q, (*a).to_string()))
                    .collect(),
            );
            self
        }

        /// An htslib install under /opt/hts
        pub(crate) fn htslib() -> Self {
            Self::default().with(
                "htslib",
                &[
                    (Query::IncludeDirs, "-I/opt/hts/include -I/opt/deps/include\n"),
                    (Query::LibraryDirs, "-L/opt/hts/lib\n"),
                    (Query::Libraries, "-lhts -lz -lhts -lbz2\n"),
                    (Query::OtherCflags, "-pthread -DHTS_LZMA -DHTS_LEVEL=3\n"),
                ],
            )
        }
    }

    impl PackageRegistry for StaticRegistry {
        fn exists(&self, library: &str) -> Result<bool, ResolveError> {
            Ok(self.records.contains_key(library))
        }

        fn query(&self, library: &str, query: Query) -> Result<String, ResolveError> {
            Ok(self
                .records
                .get(library)
                .and_then(|r| r.get(&query))
                .cloned()
                .unwrap_or_default())
        }
    }

    /// Header source that records every path it is asked for and serves
    /// files from disk
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSource {
        pub(crate) reads: RefCell<Vec<PathBuf>>,
        /// Fail every read with this kind instead of touching the disk
        pub(crate) fail_with: Option<io::ErrorKind>,
    }

    impl HeaderSource for RecordingSource {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.reads.borrow_mut().push(path.to_path_buf());
            match self.fail_with {
                Some(kind) => Err(io::Error::new(kind, "read refused")),
                None => fs::read_to_string(path),
            }
        }
    }

    /// Create a temporary native project: `src/` holding a public header
    /// with directives and one source implementing it.
    pub(crate) fn create_project_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir_all(&src).expect("Failed to create src dir");

        fs::write(
            src.join("clair3_pileup.h"),
            "#ifndef CLAIR3_PILEUP_H\n\
             #define CLAIR3_PILEUP_H\n\
             int pileup_count(int n);\n\
             #endif\n",
        )
        .expect("Failed to write header");
        fs::write(
            src.join("clair3_pileup.c"),
            "#include \"clair3_pileup.h\"\nint pileup_count(int n) { return n; }\n",
        )
        .expect("Failed to write source");

        (temp_dir, src)
    }
}
