use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::extract::TrFunctionTable;

pub const CONFIG_FILE_NAME: &str = ".trscanrc.json";

pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "c", "c++", "cc", "cpp", "cxx", "ch", "h", "h++", "hh", "hpp", "hxx",
];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub include_paths: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub tr_function_aliases: Vec<String>,
    #[serde(default = "default_source_root")]
    pub source_root: String,
}

fn default_includes() -> Vec<String> {
    vec![".".to_string()]
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_source_root() -> String {
    "./".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: default_includes(),
            ignores: Vec::new(),
            extensions: default_extensions(),
            include_paths: Vec::new(),
            excludes: Vec::new(),
            tr_function_aliases: Vec::new(),
            source_root: default_source_root(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns in `ignores` or `includes`,
    /// invalid regexes in `excludes`, and malformed `trFunctionAliases`.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        self.compile_excludes()?;
        self.function_table()?;

        Ok(())
    }

    pub fn compile_excludes(&self) -> Result<Vec<Regex>> {
        self.excludes
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("Invalid regex in 'excludes': \"{}\"", pattern))
            })
            .collect()
    }

    /// The default call table with every configured alias applied in order.
    pub fn function_table(&self) -> Result<TrFunctionTable> {
        let mut table = TrFunctionTable::default();
        for spec in &self.tr_function_aliases {
            table
                .apply_alias_spec(spec)
                .with_context(|| format!("Invalid entry in 'trFunctionAliases': \"{}\"", spec))?;
        }
        Ok(table)
    }

    pub fn include_path_bufs(&self, base: &Path) -> Vec<PathBuf> {
        self.include_paths.iter().map(|p| base.join(p)).collect()
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
