//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
//! Permission resolution core for the W-PAS workspace: the category
//! catalogue, override merging, the most-specific-prefix resolver, the
//! bypass set, the enforcement entry point, and the in-process role
//! directory plus decision auditing built on top of them.

#![warn(missing_docs)]

pub mod audit;
pub mod bypass;
pub mod catalog;
pub mod directory;
pub mod enforce;
pub mod map;
pub mod metrics;
pub mod resolver;

pub use audit::{DecisionLog, DecisionRecord};
pub use bypass::{is_bypass_role, normalize_role, BypassRole};
pub use catalog::{Action, CatalogError, CategoryCatalog, CategoryPath};
pub use directory::{DirectoryError, RoleDirectory, RoleRecord};
pub use enforce::{authorize, Decision, DecisionReason};
pub use map::{ActionFlags, OverrideParseError, Overrides, PermissionMap};
pub use metrics::AccessMetrics;
pub use resolver::{evaluate, evaluate_key, PermissionKey};
