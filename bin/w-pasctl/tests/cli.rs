//! ---
//! pas_section: "05-networking-external-interfaces"
//! pas_subsection: "binary"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Control CLI for administrators interacting with W-PAS."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::io::Write;

use assert_cmd::Command;

fn ctl() -> Command {
    Command::cargo_bin("w-pasctl").expect("w-pasctl binary")
}

#[test]
fn catalog_lists_builtin_paths_and_actions() {
    let output = ctl().arg("catalog").output().expect("run w-pasctl catalog");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("Actions: view, create, edit, delete, manage"));
    assert!(stdout.contains("HR.Attendance.ManpowerSupplier"));
    assert!(stdout.contains("Dashboard"));
}

#[test]
fn check_reports_bypass_allow_with_exit_zero() {
    let output = ctl()
        .args(["check", "--role", "Admin", "--key", "HR.Payroll.manage"])
        .output()
        .expect("run w-pasctl check");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("ALLOW"));
    assert!(stdout.contains("role_bypass"));
}

#[test]
fn check_denies_against_defaults_with_exit_two() {
    ctl()
        .args(["check", "--role", "HR Clerk", "--key", "HR.view"])
        .assert()
        .code(2);
}

#[test]
fn check_honours_an_override_blob_file() {
    let mut blob = tempfile::NamedTempFile::new().expect("temp blob");
    write!(
        blob,
        "{}",
        r#"{"HR.Attendance":{"view":true,"create":true,"edit":false,"delete":false,"manage":false}}"#
    )
    .expect("write blob");

    let output = ctl()
        .args([
            "check",
            "--role",
            "HR Officer",
            "--key",
            "HR.Attendance.Entry.view",
            "--overrides",
        ])
        .arg(blob.path())
        .output()
        .expect("run w-pasctl check");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("permission_granted"));
}

#[test]
fn validate_rejects_a_malformed_blob() {
    let mut blob = tempfile::NamedTempFile::new().expect("temp blob");
    write!(blob, "{{not json").expect("write blob");

    ctl()
        .args(["validate", "--overrides"])
        .arg(blob.path())
        .assert()
        .failure();
}

#[test]
fn validate_warns_about_paths_outside_the_catalogue() {
    let mut blob = tempfile::NamedTempFile::new().expect("temp blob");
    write!(
        blob,
        "{}",
        r#"{"Logistics.Fleet":{"view":true,"create":false,"edit":false,"delete":false,"manage":false}}"#
    )
    .expect("write blob");

    let output = ctl()
        .args(["validate", "--overrides"])
        .arg(blob.path())
        .output()
        .expect("run w-pasctl validate");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("Logistics.Fleet"));
}
