use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::CliTest;

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .trscanrc.json

    ----- stderr -----
    ");

    let content = test.read_file(".trscanrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["includes"], serde_json::json!(["."]));
    assert!(parsed.get("includePaths").is_some());
    assert!(parsed.get("trFunctionAliases").is_some());

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".trscanrc.json", "{}")?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    Error: .trscanrc.json already exists
    ");

    assert_eq!(test.read_file(".trscanrc.json")?, "{}");
    Ok(())
}

#[test]
fn test_init_into_source_root() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("app/main.cpp", "")?;

    assert_cmd_snapshot!(test.command().args(["init", "--source-root", "app"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created app/.trscanrc.json

    ----- stderr -----
    ");

    let parsed: Value = serde_json::from_str(&test.read_file("app/.trscanrc.json")?)?;
    assert_eq!(parsed["sourceRoot"], "./");
    Ok(())
}
