//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalog::CategoryCatalog;
use crate::map::{Overrides, PermissionMap};

/// Stored representation of a role inside the directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRecord {
    /// Role name exactly as persisted. Bypass normalization applies only to
    /// bypass matching, never to directory identity.
    pub name: String,
    /// Raw override blob exactly as persisted; `None` means pure defaults.
    pub overrides: Option<String>,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last overrides write.
    pub updated_at: DateTime<Utc>,
}

/// Errors returned by the role directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Role not present in the directory.
    #[error("role not found: {0}")]
    RoleNotFound(String),
}

/// Seed document loaded at daemon startup (`[roles."HR Officer".overrides."HR"]`).
#[derive(Debug, Deserialize)]
struct RoleSeedFile {
    #[serde(default)]
    roles: IndexMap<String, RoleSeedEntry>,
}

#[derive(Debug, Deserialize)]
struct RoleSeedEntry {
    overrides: Option<Overrides>,
}

/// In-memory role directory standing in for the persistence boundary.
///
/// Holds raw blobs only; resolved maps are built fresh on every request so
/// an overrides write is visible to the next evaluation without any cache
/// invalidation protocol.
#[derive(Debug, Clone)]
pub struct RoleDirectory {
    catalog: Arc<CategoryCatalog>,
    roles: Arc<RwLock<HashMap<String, RoleRecord>>>,
}

impl RoleDirectory {
    /// Create an empty directory over the given catalogue.
    pub fn new(catalog: Arc<CategoryCatalog>) -> Self {
        Self {
            catalog,
            roles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a role entry if absent, leaving stored overrides alone.
    pub fn upsert_role(&self, name: &str) -> RoleRecord {
        let mut roles = self.roles.write();
        let now = Utc::now();
        roles
            .entry(name.to_string())
            .or_insert_with(|| RoleRecord {
                name: name.to_string(),
                overrides: None,
                created_at: now,
                updated_at: now,
            })
            .clone()
    }

    /// Store the raw override blob for an existing role.
    ///
    /// The blob is stored verbatim; administrative surfaces validate before
    /// calling, runtime evaluation tolerates anything (fail-closed merge).
    pub fn set_overrides(&self, name: &str, blob: Option<String>) -> Result<(), DirectoryError> {
        let mut roles = self.roles.write();
        let record = roles
            .get_mut(name)
            .ok_or_else(|| DirectoryError::RoleNotFound(name.to_string()))?;
        record.overrides = blob;
        record.updated_at = Utc::now();
        Ok(())
    }

    /// Retrieve a role by exact name.
    pub fn get_role(&self, name: &str) -> Option<RoleRecord> {
        self.roles.read().get(name).cloned()
    }

    /// Defaults merged with the role's current blob, built fresh per call.
    /// `None` when the role is unknown to the directory.
    pub fn resolved_map(&self, name: &str) -> Option<PermissionMap> {
        let record = self.get_role(name)?;
        let defaults = PermissionMap::defaults(&self.catalog);
        Some(PermissionMap::merged(&defaults, record.overrides.as_deref()))
    }

    /// All roles, name-sorted.
    pub fn list_roles(&self) -> Vec<RoleRecord> {
        let mut roles: Vec<RoleRecord> = self.roles.read().values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    /// Number of stored roles.
    pub fn len(&self) -> usize {
        self.roles.read().len()
    }

    /// Whether the directory holds no roles.
    pub fn is_empty(&self) -> bool {
        self.roles.read().is_empty()
    }

    /// The catalogue this directory resolves against.
    pub fn catalog(&self) -> Arc<CategoryCatalog> {
        self.catalog.clone()
    }

    /// Load roles from a TOML seed file, returning how many were loaded.
    /// Existing roles with the same names have their overrides replaced.
    pub fn seed_from_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("unable to read role seed {}", path.display()))?;
        let seed: RoleSeedFile = toml::from_str(&raw)
            .with_context(|| format!("invalid role seed {}", path.display()))?;
        let count = seed.roles.len();
        for (name, entry) in seed.roles {
            self.upsert_role(&name);
            let blob = entry.overrides.map(|overrides| overrides.to_json());
            self.set_overrides(&name, blob)?;
        }
        info!(count, path = %path.display(), "seeded role directory");
        Ok(count)
    }
}
