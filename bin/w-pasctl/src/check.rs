//! ---
//! pas_section: "05-networking-external-interfaces"
//! pas_subsection: "binary"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Control CLI for administrators interacting with W-PAS."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use w_pas_policy::catalog::CategoryCatalog;
use w_pas_policy::enforce::authorize;
use w_pas_policy::map::{Overrides, PermissionMap};

/// Options for a one-shot decision check.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Acting role name. Omit to probe the unauthenticated path.
    #[arg(long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Permission key to evaluate (e.g. `HR.Attendance.view`). Omit to
    /// probe an unrestricted operation.
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,

    /// Override blob file applied on top of the all-deny defaults.
    #[arg(long, value_name = "FILE")]
    pub overrides: Option<PathBuf>,

    /// Catalogue file (TOML). Defaults to the built-in seed.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}

/// Evaluate one decision and render it. Exit code 0 for allow, 2 for deny.
pub fn run(args: CheckArgs) -> Result<i32> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let mut map = PermissionMap::defaults(&catalog);
    if let Some(path) = &args.overrides {
        let blob = fs::read_to_string(path)
            .with_context(|| format!("unable to read override blob {}", path.display()))?;
        let overrides = Overrides::parse(&blob)
            .with_context(|| format!("invalid override blob {}", path.display()))?;
        map.apply(overrides);
    }

    let decision = authorize(args.role.as_deref(), Some(&map), args.key.as_deref());
    println!("Role:     {}", args.role.as_deref().unwrap_or("<none>"));
    println!("Key:      {}", args.key.as_deref().unwrap_or("<none>"));
    println!(
        "Decision: {}",
        if decision.allow { "ALLOW" } else { "DENY" }
    );
    println!("Reason:   {}", decision.reason.as_str());

    Ok(if decision.allow { 0 } else { 2 })
}

fn load_catalog(path: Option<&Path>) -> Result<CategoryCatalog> {
    match path {
        Some(path) => CategoryCatalog::from_toml_file(path),
        None => Ok(CategoryCatalog::builtin().clone()),
    }
}
