//! End-to-end tests for the `dotmeta` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn dotmeta(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dotmeta"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

fn solution_fixture(root: &Path) -> PathBuf {
    write(
        root,
        "P/P.csproj",
        r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup>
    <Reference Include="Newtonsoft.Json">
      <HintPath>..\packages\Newtonsoft.Json.dll</HintPath>
    </Reference>
  </ItemGroup>
</Project>"#,
    );
    write(
        root,
        "S.sln",
        "Microsoft Visual Studio Solution File, Format Version 12.00\n\
         Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"P\", \"P\\P.csproj\", \"{6F0D5C1A-23B4-4C8E-9A1F-0B2C3D4E5F60}\"\n\
         EndProject\n",
    )
}

#[cfg(not(windows))]
#[test]
fn test_solution_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution_fixture(dir.path());

    let output = dotmeta(&[sln.to_str().unwrap()]);
    assert!(output.status.success());

    let expected_hint = dir.path().join("packages/Newtonsoft.Json.dll");
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({
            "references": [{
                "Include": "Newtonsoft.Json",
                "HintPath": expected_hint.to_str().unwrap(),
            }]
        })
    );
}

#[test]
fn test_descriptor_list_restricts_classification() {
    let dir = tempfile::tempdir().unwrap();
    let sln = solution_fixture(dir.path());

    let output = dotmeta(&["-d", "Nuspec,Nupkg", sln.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let error = stdout_json(&output)["error"].as_str().unwrap().to_owned();
    assert!(error.starts_with("no metadata provider found for file"), "{error}");
}

#[test]
fn test_unknown_descriptor() {
    let output = dotmeta(&["--descriptors", "Solution,Gemfile", "S.sln"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["error"], "unknown descriptor: Gemfile");
}

#[test]
fn test_manifest_relaxed_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let nuspec = write(
        dir.path(),
        "Widgets.nuspec",
        "<package><metadata><id>Widgets</id><version>1.0.0</version></metadata></package>",
    );

    let output = dotmeta(&["-d", "nuspec", nuspec.to_str().unwrap()]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["metadata"]["id"], "Widgets");
    assert_eq!(json["schemaValid"], false);
}

#[test]
fn test_read_error_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Missing.dll");

    let output = dotmeta(&[missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert!(json["error"].as_str().unwrap().contains("Missing.dll"));
}

#[test]
fn test_missing_path_argument() {
    let output = dotmeta(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_json(&output)["error"].is_string());
}
