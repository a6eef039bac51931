use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and fold `..` into
/// the preceding component. Leading `..` of a relative path are kept.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Headers are files without an extension or with one starting with `h`
/// (`.h`, `.hpp`, `.hxx`, ...).
pub fn is_header(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        None => true,
        Some(ext) => ext.is_empty() || ext.starts_with(['h', 'H']),
    }
}

/// Locate an included file.
///
/// Quoted includes are first tried relative to the including file's
/// directory; both forms then search `include_paths` in order.
pub fn resolve_include(
    including_file: &Path,
    written: &str,
    quoted: bool,
    include_paths: &[PathBuf],
) -> Option<PathBuf> {
    if quoted {
        let dir = including_file.parent().unwrap_or_else(|| Path::new(""));
        let candidate = dir.join(written);
        if candidate.is_file() {
            return Some(clean_path(&candidate));
        }
    }
    include_paths
        .iter()
        .map(|dir| dir.join(written))
        .find(|candidate| candidate.is_file())
        .map(|candidate| clean_path(&candidate))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("a/./b/../c.h")), PathBuf::from("a/c.h"));
        assert_eq!(clean_path(Path::new("../x/./y.h")), PathBuf::from("../x/y.h"));
        assert_eq!(clean_path(Path::new("/a/../../b")), PathBuf::from("/b"));
        assert_eq!(clean_path(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_is_header() {
        assert!(is_header(Path::new("widget.h")));
        assert!(is_header(Path::new("widget.HPP")));
        assert!(is_header(Path::new("QtCore/QString")));
        assert!(!is_header(Path::new("widget.cpp")));
        assert!(!is_header(Path::new("table.inc")));
    }

    #[test]
    fn test_resolve_include_prefers_including_directory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let inc = dir.path().join("include");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&inc).unwrap();
        fs::write(src.join("a.h"), "").unwrap();
        fs::write(inc.join("a.h"), "").unwrap();
        fs::write(inc.join("b.h"), "").unwrap();

        let main = src.join("main.cpp");
        let paths = vec![inc.clone()];
        assert_eq!(resolve_include(&main, "a.h", true, &paths), Some(src.join("a.h")));
        assert_eq!(resolve_include(&main, "a.h", false, &paths), Some(inc.join("a.h")));
        assert_eq!(resolve_include(&main, "b.h", true, &paths), Some(inc.join("b.h")));
        assert_eq!(resolve_include(&main, "missing.h", true, &paths), None);
    }
}
