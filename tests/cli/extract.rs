use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::CliTest;

#[test]
fn test_extract_text_output() -> Result<()> {
    let test = CliTest::with_file(
        "widget.cpp",
        r#"
namespace N {
class W {
    Q_OBJECT
    void f() { tr("hello"); }
};
}
"#,
    )?;

    assert_cmd_snapshot!(test.extract_command(), @r#"
    success: true
    exit_code: 0
    ----- stdout -----
    widget.cpp:5: N::W "hello"

    ----- stderr -----
    ✓ Extracted 1 message from 1 file
    "#);

    Ok(())
}

#[test]
fn test_extract_json_output() -> Result<()> {
    let test = CliTest::with_file(
        "main.cpp",
        r#"
void f(int n) {
    //: Shown in the status bar
    QCoreApplication::translate("Status", "%n files", nullptr, n);
}
"#,
    )?;

    let output = test.extract_command().args(["--format", "json"]).output()?;
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(parsed[0]["context"], "Status");
    assert_eq!(parsed[0]["sourceText"], "%n files");
    assert_eq!(parsed[0]["extraComment"], "Shown in the status bar");
    assert_eq!(parsed[0]["plural"], true);
    assert_eq!(parsed[0]["kind"], "translation");
    assert_eq!(parsed[0]["line"], 4);

    Ok(())
}

#[test]
fn test_extract_reports_errors_with_exit_code() -> Result<()> {
    let test = CliTest::with_file("broken.cpp", "void f() {\n")?;

    let output = test.extract_command().output()?;
    let stderr = String::from_utf8(output.stderr)?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("error: Unbalanced opening brace in C++ code"));
    assert!(stderr.contains("--> broken.cpp:1"));
    assert!(stderr.contains("1 | void f() {"));

    Ok(())
}

#[test]
fn test_extract_warnings_keep_success() -> Result<()> {
    let test = CliTest::with_file("free.cpp", "void f() { tr(\"lost\"); }\n")?;

    let output = test.extract_command().output()?;
    let stderr = String::from_utf8(output.stderr)?;

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert!(stderr.contains("warning: tr() cannot be called without context  missing-context"));

    Ok(())
}

#[test]
fn test_extract_with_include_path() -> Result<()> {
    let test = CliTest::with_file(
        "third_party/api/view.h",
        "namespace Api { class View { Q_OBJECT }; }\n",
    )?;
    test.write_file(
        "src/view.cpp",
        "#include <view.h>\nvoid Api::View::paint() { tr(\"Paint\"); }\n",
    )?;

    let output = test
        .extract_command()
        .args(["-I", "third_party/api"])
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(stdout, "src/view.cpp:2: Api::View \"Paint\"\n");

    Ok(())
}

#[test]
fn test_extract_uses_config_aliases() -> Result<()> {
    let test = CliTest::with_file(
        ".trscanrc.json",
        r#"{ "includes": ["src"], "trFunctionAliases": ["translate+=i18n"] }"#,
    )?;
    test.write_file("src/app.cpp", "void f() { i18n(\"App\", \"Quit\"); }\n")?;
    test.write_file("other/skip.cpp", "void f() { i18n(\"App\", \"Skipped\"); }\n")?;

    let output = test.extract_command().output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(stdout, "src/app.cpp:1: App \"Quit\"\n");

    Ok(())
}

#[test]
fn test_extract_invalid_config_fails() -> Result<()> {
    let test = CliTest::with_file(".trscanrc.json", r#"{ "excludes": ["("] }"#)?;

    let output = test.extract_command().output()?;
    let stderr = String::from_utf8(output.stderr)?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("Invalid regex in 'excludes'"));

    Ok(())
}
