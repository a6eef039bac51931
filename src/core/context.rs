use std::{
    cell::OnceCell,
    collections::{BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use rayon::prelude::*;

use crate::{
    cli::args::CommonArgs,
    config::{CONFIG_FILE_NAME, Config, load_config},
    core::{
        extract::{ExtractOptions, ExtractionReport, Extractor},
        file_scanner::scan_files,
        include::clean_path,
    },
};

/// An input file that could not be read.
#[derive(Debug, Clone)]
pub struct UnreadableFile {
    pub path: PathBuf,
    pub error: String,
}

/// Contents of every scanned input, in scan order.
pub struct SourceFiles {
    pub inputs: Vec<(PathBuf, String)>,
    pub unreadable: Vec<UnreadableFile>,
}

/// Project-level orchestration of one extraction run.
///
/// # Pipeline
///
/// 1. **Scan**: `files` is filled at construction from the configured
///    directories, ignores and extensions
/// 2. **Read**: `sources()` reads every file in parallel
/// 3. **Extract**: `report()` parses the inputs sequentially, in sorted
///    order, through one shared include cache
///
/// Steps 2 and 3 run lazily on first access.
///
/// # Configuration Priority
///
/// 1. CLI arguments (e.g., `-I include`)
/// 2. `.trscanrc.json` config file
/// 3. Built-in defaults
///
/// List-valued options are merged: CLI values are appended to the
/// configured ones.
pub struct ExtractContext {
    /// Merged configuration (CLI args > config file > defaults).
    pub config: Config,

    /// Project root directory (for resolving relative paths).
    pub root_dir: PathBuf,

    /// All source files to extract from, cleaned and sorted.
    pub files: BTreeSet<PathBuf>,

    /// Directory entries the scanner could not access.
    pub skipped_count: usize,

    pub verbose: bool,

    options: ExtractOptions,
    sources: OnceCell<SourceFiles>,
    report: OnceCell<ExtractionReport>,
    lines: OnceCell<HashMap<PathBuf, Vec<String>>>,
}

impl ExtractContext {
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let verbose = common_args.verbose;

        // ============================================================
        // 1. Load config from source_root
        // ============================================================
        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let config_result = load_config(&root_dir)?;
        if !config_result.from_file {
            tracing::info!("no {} found, using default configuration", CONFIG_FILE_NAME);
        }
        let mut config = config_result.config;

        // ============================================================
        // 2. Apply CLI overrides (CLI > config file > defaults)
        // ============================================================
        config.excludes.extend(common_args.exclude.iter().cloned());
        config
            .tr_function_aliases
            .extend(common_args.tr_function_alias.iter().cloned());

        let mut include_paths = config.include_path_bufs(&root_dir);
        include_paths.extend(common_args.include_path.iter().cloned());

        let options = ExtractOptions {
            include_paths,
            excludes: config.compile_excludes()?,
            functions: config.function_table()?,
        };

        // ============================================================
        // 3. Scan source files
        // ============================================================
        let scan_root = root_dir.join(&config.source_root);
        let scan_result = scan_files(
            &scan_root,
            &config.includes,
            &config.ignores,
            &config.extensions,
        );
        let files = scan_result.files.iter().map(|p| clean_path(p)).collect();

        Ok(Self {
            config,
            root_dir,
            files,
            skipped_count: scan_result.skipped_count,
            verbose,
            options,
            sources: OnceCell::new(),
            report: OnceCell::new(),
            lines: OnceCell::new(),
        })
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Read every input in parallel. Unreadable files are collected, not
    /// fatal.
    pub fn sources(&self) -> &SourceFiles {
        self.sources.get_or_init(|| {
            let results: Vec<(PathBuf, Result<String>)> = self
                .files
                .par_iter()
                .map(|path| (path.clone(), read_source(path)))
                .collect();

            let mut inputs = Vec::with_capacity(results.len());
            let mut unreadable = Vec::new();
            for (path, result) in results {
                match result {
                    Ok(source) => inputs.push((path, source)),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "cannot read input");
                        unreadable.push(UnreadableFile {
                            path,
                            error: format!("{:#}", err),
                        });
                    }
                }
            }
            SourceFiles { inputs, unreadable }
        })
    }

    /// The extraction result, computed on first access.
    pub fn report(&self) -> &ExtractionReport {
        self.report.get_or_init(|| {
            let extractor = Extractor::new(self.options.clone());
            extractor.extract_files(&self.sources().inputs)
        })
    }

    /// A 1-indexed line of an input, for diagnostic context.
    ///
    /// Only inputs are available; lines of included files that were not
    /// scanned themselves return None.
    pub fn source_line(&self, path: &Path, line: usize) -> Option<&str> {
        let lines = self.lines.get_or_init(|| {
            self.sources()
                .inputs
                .iter()
                .map(|(path, source)| (path.clone(), source.lines().map(String::from).collect()))
                .collect()
        });
        lines
            .get(path)?
            .get(line.checked_sub(1)?)
            .map(String::as_str)
    }
}

/// Read a source file, replacing invalid UTF-8.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn args(root: &Path) -> CommonArgs {
        CommonArgs {
            source_root: Some(root.to_path_buf()),
            include_path: Vec::new(),
            exclude: Vec::new(),
            tr_function_alias: Vec::new(),
            verbose: false,
        }
    }

    #[test]
    fn test_context_extracts_scanned_files() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(
            dir.path().join("widget.cpp"),
            "class W { Q_OBJECT void f() { tr(\"hello\"); } };\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "tr(\"ignored\")").unwrap();

        let ctx = ExtractContext::new(&args(dir.path())).unwrap();
        assert_eq!(ctx.files.len(), 1);

        let report = ctx.report();
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.messages[0].context, "W");
        assert!(ctx.sources().unreadable.is_empty());
    }

    #[test]
    fn test_cli_aliases_are_applied() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(
            dir.path().join("main.cpp"),
            "void f() { i18n(\"Ctx\", \"hello\"); }\n",
        )
        .unwrap();

        let mut common = args(dir.path());
        common.tr_function_alias = vec!["translate+=i18n".to_string()];
        let ctx = ExtractContext::new(&common).unwrap();

        assert_eq!(ctx.report().messages[0].context, "Ctx");
    }

    #[test]
    fn test_invalid_cli_exclude_fails() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let mut common = args(dir.path());
        common.exclude = vec!["(".to_string()];
        assert!(ExtractContext::new(&common).is_err());
    }

    #[test]
    fn test_source_line_lookup() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("a.cpp"), "first\nsecond\n").unwrap();

        let ctx = ExtractContext::new(&args(dir.path())).unwrap();
        let path = ctx.files.iter().next().unwrap().clone();
        assert_eq!(ctx.source_line(&path, 2), Some("second"));
        assert_eq!(ctx.source_line(&path, 0), None);
        assert_eq!(ctx.source_line(&path, 9), None);
    }
}
