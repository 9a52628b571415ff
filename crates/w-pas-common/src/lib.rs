//! ---
//! pas_section: "01-core-functionality"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Shared primitives and utilities for the service runtime."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
//! Shared runtime primitives for the W-PAS workspace: configuration
//! loading, logging bootstrap, and version metadata consumed by every
//! binary and service crate.

pub mod config;
pub mod logging;
pub mod version;

pub use config::{
    ApiConfig, AppConfig, AuditConfig, CatalogConfig, LoadedAppConfig, LoggingConfig,
    MetricsConfig, RolesConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use version::VersionInfo;
