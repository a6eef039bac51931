use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
pub struct ScanResult {
    /// Sorted, so that parse order (and with it cache reuse) is reproducible.
    pub files: BTreeSet<PathBuf>,
    pub skipped_count: usize,
}

pub fn scan_files(
    base_dir: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    extensions: &[String],
) -> ScanResult {
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => tracing::warn!(pattern = %p, error = %e, "invalid ignore pattern"),
            }
        } else {
            literal_ignore_paths.push(base_dir.join(p));
        }
    }

    let dirs_to_scan: Vec<PathBuf> = if includes.is_empty() {
        vec![base_dir.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in includes {
            if is_glob_pattern(inc) {
                let full_pattern = base_dir.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten().filter(|e| e.is_dir())),
                    Err(e) => tracing::warn!(pattern = %inc, error = %e, "invalid include pattern"),
                }
            } else {
                let path = base_dir.join(inc);
                if path.exists() {
                    paths.push(path);
                } else {
                    tracing::warn!(path = %path.display(), "include directory does not exist");
                }
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        for entry in WalkDir::new(&dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    tracing::warn!(error = %e, "cannot access path");
                    continue;
                }
            };
            let path = entry.path();

            if literal_ignore_paths
                .iter()
                .any(|ignore_path| path.starts_with(ignore_path))
            {
                continue;
            }

            let path_str = path.to_string_lossy();
            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }

            if path.is_file() && is_scannable_file(path, extensions) {
                files.insert(path.to_path_buf());
            }
        }
    }

    tracing::debug!(files = files.len(), skipped = skipped_count, "scanned source tree");
    ScanResult {
        files,
        skipped_count,
    }
}

fn is_scannable_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::config::DEFAULT_EXTENSIONS;

    use super::*;

    fn extensions() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_scan_cpp_files() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        File::create(dir_path.join("main.cpp")).unwrap();
        File::create(dir_path.join("widget.h")).unwrap();
        File::create(dir_path.join("README.md")).unwrap();

        let result = scan_files(dir_path, &[], &[], &extensions());

        assert_eq!(result.files.len(), 2);
        assert!(result.files.iter().any(|f| f.ends_with("main.cpp")));
        assert!(result.files.iter().any(|f| f.ends_with("widget.h")));
    }

    #[test]
    fn test_scan_ignores_glob_pattern() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let build = dir_path.join("build");
        fs::create_dir(&build).unwrap();
        File::create(build.join("moc_widget.cpp")).unwrap();
        File::create(dir_path.join("widget.cpp")).unwrap();

        let result = scan_files(dir_path, &[], &["**/build/**".to_owned()], &extensions());

        assert_eq!(result.files.len(), 1);
        assert!(!result.files.iter().any(|f| f.starts_with(&build)));
    }

    #[test]
    fn test_scan_ignores_literal_directory_path() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let vendored = dir_path.join("src").join("3rdparty");
        fs::create_dir_all(&vendored).unwrap();
        File::create(vendored.join("zlib.c")).unwrap();
        File::create(dir_path.join("src").join("app.cpp")).unwrap();

        let result = scan_files(
            dir_path,
            &["src".to_owned()],
            &["src/3rdparty".to_owned()],
            &extensions(),
        );

        assert_eq!(result.files.len(), 1);
        assert!(result.files.iter().any(|f| f.ends_with("app.cpp")));
    }

    #[test]
    fn test_scan_with_glob_include() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let core = dir_path.join("modules").join("core");
        fs::create_dir_all(&core).unwrap();
        File::create(core.join("engine.cpp")).unwrap();
        let tools = dir_path.join("tools");
        fs::create_dir_all(&tools).unwrap();
        File::create(tools.join("gen.cpp")).unwrap();

        let result = scan_files(dir_path, &["modules/*".to_owned()], &[], &extensions());

        assert_eq!(result.files.len(), 1);
        assert!(result.files.iter().any(|f| f.ends_with("engine.cpp")));
    }

    #[test]
    fn test_scan_deduplicates_overlapping_includes() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();

        let widgets = dir_path.join("src").join("widgets");
        fs::create_dir_all(&widgets).unwrap();
        File::create(widgets.join("button.cpp")).unwrap();

        let result = scan_files(
            dir_path,
            &["src".to_owned(), "src/widgets".to_owned()],
            &[],
            &extensions(),
        );

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn test_scan_with_nonexistent_include() {
        let dir = tempdir().unwrap();
        let dir_path = dir.path();
        fs::create_dir(dir_path.join("src")).unwrap();
        File::create(dir_path.join("src").join("app.cpp")).unwrap();

        let result = scan_files(
            dir_path,
            &["src".to_owned(), "missing".to_owned()],
            &[],
            &extensions(),
        );

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn test_is_scannable_file() {
        let exts = extensions();
        assert!(is_scannable_file(Path::new("a.cpp"), &exts));
        assert!(is_scannable_file(Path::new("a.HPP"), &exts));
        assert!(is_scannable_file(Path::new("a.c++"), &exts));
        assert!(!is_scannable_file(Path::new("a.ui"), &exts));
        assert!(!is_scannable_file(Path::new("Makefile"), &exts));
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("src/*"));
        assert!(is_glob_pattern("file?.cpp"));
        assert!(!is_glob_pattern("src/widgets"));
    }
}
