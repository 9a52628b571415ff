//! ---
//! pas_section: "15-testing-qa-runbook"
//! pas_subsection: "integration-tests"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Integration and validation tests for the W-PAS stack."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::sync::Arc;

use tempfile::tempdir;
use w_pas_policy::audit::DecisionLog;
use w_pas_policy::catalog::CategoryCatalog;
use w_pas_policy::directory::RoleDirectory;
use w_pas_policy::enforce::{authorize, DecisionReason};
use w_pas_policy::metrics::AccessMetrics;

#[test]
fn end_to_end_authorization_flow() {
    // Directory with one restricted role
    let catalog = Arc::new(CategoryCatalog::builtin().clone());
    let directory = RoleDirectory::new(catalog);
    directory.upsert_role("HR Officer");
    directory
        .set_overrides(
            "HR Officer",
            Some(
                r#"{"HR.Attendance":{"view":true,"create":true,"edit":false,"delete":false,"manage":false}}"#
                    .to_string(),
            ),
        )
        .unwrap();

    // Resolution through the stored blob: exact grant plus prefix fallback
    let map = directory.resolved_map("HR Officer").unwrap();
    let granted = authorize(
        Some("HR Officer"),
        Some(&map),
        Some("HR.Attendance.Entry.view"),
    );
    assert!(granted.allow);
    assert_eq!(granted.reason, DecisionReason::PermissionGranted);

    let denied = authorize(Some("HR Officer"), Some(&map), Some("HR.Payroll.view"));
    assert!(!denied.allow);
    assert_eq!(denied.reason, DecisionReason::PermissionDenied);

    // Bypass roles never consult the map
    let bypass = authorize(Some("SUPER  ADMIN"), Some(&map), Some("HR.Payroll.manage"));
    assert!(bypass.allow);
    assert_eq!(bypass.reason, DecisionReason::RoleBypass);

    // Audit trail records the decisions and stays verifiable
    let dir = tempdir().unwrap();
    let path = dir.path().join("decisions.ndjson");
    let mut log = DecisionLog::new(&path).unwrap();
    log.append(Some("HR Officer"), Some("HR.Attendance.Entry.view"), granted)
        .unwrap();
    log.append(Some("HR Officer"), Some("HR.Payroll.view"), denied)
        .unwrap();
    log.append(Some("SUPER  ADMIN"), Some("HR.Payroll.manage"), bypass)
        .unwrap();
    assert!(log.verify().unwrap());

    // Metrics counters see all three decisions
    let registry = Arc::new(prometheus::Registry::new());
    let metrics = AccessMetrics::new(registry.clone()).unwrap();
    metrics.record(&granted);
    metrics.record(&denied);
    metrics.record(&bypass);
    assert_eq!(registry.gather().len(), 3);
}

#[test]
fn seeded_directory_matches_daemon_startup_flow() {
    let dir = tempdir().unwrap();
    let seed_path = dir.path().join("roles.toml");
    std::fs::write(
        &seed_path,
        r#"
[roles."HR Officer".overrides."HR.Attendance"]
view = true
create = true

[roles."HR Officer".overrides."HR.Attendance.Records"]

[roles.Viewer]
"#,
    )
    .unwrap();

    let directory = RoleDirectory::new(Arc::new(CategoryCatalog::builtin().clone()));
    let seeded = directory.seed_from_file(&seed_path).unwrap();
    assert_eq!(seeded, 2);

    // The blanket attendance grant holds, but the records carve-out wins
    // by being more specific.
    let map = directory.resolved_map("HR Officer").unwrap();
    assert!(authorize(Some("HR Officer"), Some(&map), Some("HR.Attendance.Entry.view")).allow);
    assert!(
        !authorize(
            Some("HR Officer"),
            Some(&map),
            Some("HR.Attendance.Records.view")
        )
        .allow
    );

    // A seeded role without overrides resolves to pure defaults.
    let viewer = directory.resolved_map("Viewer").unwrap();
    assert!(!authorize(Some("Viewer"), Some(&viewer), Some("Dashboard.view")).allow);
}

#[test]
fn tampered_audit_trail_fails_verification() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("decisions.ndjson");

    let mut log = DecisionLog::new(&path).unwrap();
    let decision = authorize(Some("Admin"), None, Some("Admin.edit"));
    log.append(Some("Admin"), Some("Admin.edit"), decision)
        .unwrap();
    log.append(Some("Admin"), Some("Admin.view"), decision)
        .unwrap();
    assert!(log.verify().unwrap());

    let raw = std::fs::read_to_string(&path).unwrap();
    let tampered = raw.replacen("\"allow\":true", "\"allow\":false", 1);
    assert_ne!(raw, tampered);
    std::fs::write(&path, tampered).unwrap();

    let reopened = DecisionLog::new(&path).unwrap();
    assert!(!reopened.verify().unwrap());
}
