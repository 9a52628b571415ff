//! ---
//! pas_section: "01-core-functionality"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Shared primitives and utilities for the service runtime."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    EmitBuilder::builder().all_cargo().all_git().emit()?;

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
