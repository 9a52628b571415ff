//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "example"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Example exercising the decision engine end to end."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---

use w_pas_policy::audit::DecisionLog;
use w_pas_policy::enforce::authorize;

fn main() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("decisions.ndjson");

    // Record a handful of decisions into a fresh trail.
    let mut log = DecisionLog::new(&path)?;
    for (role, key) in [
        (Some("Admin"), Some("HR.Payroll.manage")),
        (Some("HR Officer"), Some("HR.Attendance.Entry.view")),
        (None, Some("Finance.view")),
    ] {
        let decision = authorize(role, None, key);
        let record = log.append(role, key, decision)?;
        println!(
            "appended {} allow={} reason={}",
            record.id,
            record.allow,
            record.reason.as_str()
        );
    }

    // Each line hashes its predecessor, so edits to any record break the
    // chain for every later entry.
    println!("chain intact: {}", log.verify()?);

    let reopened = DecisionLog::new(&path)?;
    println!("reopened chain intact: {}", reopened.verify()?);
    Ok(())
}
