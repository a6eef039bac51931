use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::{args::InitCommand, exit_status::ExitStatus, report::SUCCESS_MARK};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init(cmd: InitCommand) -> Result<ExitStatus> {
    let dir = cmd.source_root.unwrap_or_else(|| PathBuf::from("."));
    match write_default_config(&dir)? {
        Some(path) => {
            println!(
                "{} {}",
                SUCCESS_MARK.green(),
                format!("Created {}", display_name(&dir, &path)).green()
            );
            Ok(ExitStatus::Success)
        }
        None => {
            let existing = dir.join(CONFIG_FILE_NAME);
            eprintln!("Error: {} already exists", display_name(&dir, &existing));
            Ok(ExitStatus::Failure)
        }
    }
}

/// Create the default config in `dir`. Returns None, leaving the file
/// untouched, when one is already there.
pub fn write_default_config(dir: &Path) -> Result<Option<PathBuf>> {
    let path = dir.join(CONFIG_FILE_NAME);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to create {}", path.display()));
        }
    };
    file.write_all(default_config_json()?.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path))
}

/// The bare file name when writing to the current directory.
fn display_name(dir: &Path, path: &Path) -> String {
    if dir == Path::new(".") {
        CONFIG_FILE_NAME.to_string()
    } else {
        path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::config::Config;

    #[test]
    fn test_writes_loadable_default_config() {
        let dir = tempdir().unwrap();
        let path = write_default_config(dir.path()).unwrap().unwrap();

        assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));
        let config: Config = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.includes, vec!["."]);
    }

    #[test]
    fn test_existing_config_is_kept() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{}").unwrap();

        assert!(write_default_config(dir.path()).unwrap().is_none());
        assert_eq!(fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap(), "{}");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(write_default_config(&dir.path().join("absent")).is_err());
    }
}
