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
use w_pas_policy::map::Overrides;

/// Options for fail-loud override blob validation.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Override blob file to validate.
    #[arg(long, value_name = "FILE")]
    pub overrides: PathBuf,

    /// Catalogue file (TOML). Defaults to the built-in seed.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}

/// Parse the blob, then report entries that fall outside the catalogue.
///
/// Unknown paths are warnings, not errors: the engine accepts and stores
/// them, they are just unreachable from catalogue-driven route checks.
pub fn run(args: ValidateArgs) -> Result<i32> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let blob = fs::read_to_string(&args.overrides)
        .with_context(|| format!("unable to read override blob {}", args.overrides.display()))?;
    let overrides = Overrides::parse(&blob)
        .with_context(|| format!("invalid override blob {}", args.overrides.display()))?;

    println!("Entries: {}", overrides.len());
    let unknown = overrides.unknown_paths(&catalog).collect::<Vec<_>>();
    if unknown.is_empty() {
        println!("All override paths are declared in the catalogue");
    } else {
        println!("Paths outside the catalogue ({}):", unknown.len());
        for path in unknown {
            println!("  {path}");
        }
    }
    Ok(0)
}

fn load_catalog(path: Option<&Path>) -> Result<CategoryCatalog> {
    match path {
        Some(path) => CategoryCatalog::from_toml_file(path),
        None => Ok(CategoryCatalog::builtin().clone()),
    }
}
