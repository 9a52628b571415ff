//! ---
//! pas_section: "05-networking-external-interfaces"
//! pas_subsection: "binary"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Control CLI for administrators interacting with W-PAS."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use w_pas_policy::catalog::{Action, CategoryCatalog};

/// Options for printing the effective catalogue.
#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalogue file (TOML). Defaults to the built-in seed.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}

/// Render the catalogue paths and the action set.
pub fn run(args: CatalogArgs) -> Result<i32> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let actions = Action::ALL
        .iter()
        .map(|action| action.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Actions: {actions}");
    println!("Paths ({}):", catalog.len());
    for path in catalog.paths() {
        println!("  {path}");
    }
    Ok(0)
}

fn load_catalog(path: Option<&Path>) -> Result<CategoryCatalog> {
    match path {
        Some(path) => CategoryCatalog::from_toml_file(path),
        None => Ok(CategoryCatalog::builtin().clone()),
    }
}
