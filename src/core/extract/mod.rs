//! Phase 2: Extraction - Per-file parsing and message collection.
//!
//! This module drives the scope-tracking parser over each input file,
//! following includes through the shared [`IncludeCache`] and collecting
//! candidate messages together with the diagnostics found along the way.
//!
//! ## Module Structure
//!
//! - `tr_functions`: The table of recognized localization calls and their aliases
//! - `parser`: Scope tracking, class heads, namespaces, includes
//! - `handlers`: Argument matching and context resolution for each call shape

mod handlers;
mod parser;
pub mod tr_functions;

use std::path::{Path, PathBuf};

use crate::{
    core::{
        data::CandidateMessage,
        include::{CacheKey, IncludeCache, clean_path, is_header},
    },
    issues::Diagnostic,
};

pub use parser::ExtractOptions;
pub use tr_functions::{AliasError, TrFunction, TrFunctionTable};

use parser::{Env, parse_detached, record_results};

/// Everything one extraction run produced.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub messages: Vec<CandidateMessage>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extracts messages from a set of files sharing one include cache.
#[derive(Debug, Default)]
pub struct Extractor {
    options: ExtractOptions,
    cache: IncludeCache,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            cache: IncludeCache::new(),
        }
    }

    pub fn cache(&self) -> &IncludeCache {
        &self.cache
    }

    /// Parse every input in order, then collect the messages of those not
    /// parsed inline as part of another file.
    ///
    /// Inputs already parsed as top-level headers through an earlier
    /// include are not parsed again; their messages were stored then.
    pub fn extract_files(&self, inputs: &[(PathBuf, String)]) -> ExtractionReport {
        let env = Env {
            options: &self.options,
            cache: &self.cache,
        };
        let mut diagnostics = Vec::new();
        let paths: Vec<PathBuf> = inputs.iter().map(|(path, _)| clean_path(path)).collect();

        for (path, (_, source)) in paths.iter().zip(inputs) {
            if self.already_parsed(path) {
                tracing::debug!(path = %path.display(), "skipping input parsed through an include");
                continue;
            }
            let stack = vec![path.clone()];
            let detached = parse_detached(env, path, source, stack, &mut diagnostics);
            record_results(&self.cache, path, detached, is_header(path));
        }

        let messages = paths
            .iter()
            .filter(|path| !self.cache.is_blacklisted(path))
            .flat_map(|path| self.cache.messages(path))
            .collect();

        ExtractionReport {
            messages,
            diagnostics,
        }
    }

    /// Convenience wrapper for a single in-memory file.
    pub fn extract_source(&self, path: impl AsRef<Path>, source: &str) -> ExtractionReport {
        self.extract_files(&[(path.as_ref().to_path_buf(), source.to_string())])
    }

    fn already_parsed(&self, path: &Path) -> bool {
        !self.cache.get_results(&CacheKey::top_level(path)).is_empty()
            || self.cache.is_blacklisted(path)
    }
}
