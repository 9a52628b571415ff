//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "example"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Example exercising the decision engine end to end."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
/*! ---
pas_section: "02-permission-resolution"
pas_subsection: "09-examples"
pas_type: "code"
pas_scope: "core"
pas_description: "Example demonstrating role overrides and prefix resolution."
pas_version: "v0.1.0"
pas_owner: "tbd"
--- */

use std::sync::Arc;

use w_pas_policy::catalog::CategoryCatalog;
use w_pas_policy::directory::RoleDirectory;
use w_pas_policy::enforce::authorize;

fn main() -> anyhow::Result<()> {
    // Provision a directory with one restricted role.
    let directory = RoleDirectory::new(Arc::new(CategoryCatalog::builtin().clone()));
    directory.upsert_role("HR Officer");
    directory.set_overrides(
        "HR Officer",
        Some(
            r#"{"HR.Attendance":{"view":true,"create":true,"edit":false,"delete":false,"manage":false}}"#
                .to_string(),
        ),
    )?;

    // Deeper keys fall back to the nearest configured ancestor.
    let map = directory.resolved_map("HR Officer");
    for key in [
        "HR.Attendance.Entry.view",
        "HR.Attendance.Entry.delete",
        "HR.Payroll.view",
        "Dashboard.view",
    ] {
        let decision = authorize(Some("HR Officer"), map.as_ref(), Some(key));
        println!(
            "{key}: allow={} reason={}",
            decision.allow,
            decision.reason.as_str()
        );
    }

    // Bypass roles never consult the map.
    let decision = authorize(Some("SUPER ADMIN"), map.as_ref(), Some("HR.Payroll.manage"));
    println!(
        "SUPER ADMIN HR.Payroll.manage: allow={} reason={}",
        decision.allow,
        decision.reason.as_str()
    );
    Ok(())
}
