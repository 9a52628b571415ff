//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::{Action, CategoryCatalog, CategoryPath};

/// Per-category record of the five action flags.
///
/// A stored override record is a complete flag set: a flag omitted from the
/// persisted form is `false`, never "unchanged".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFlags {
    /// Allow `view`.
    #[serde(default)]
    pub view: bool,
    /// Allow `create`.
    #[serde(default)]
    pub create: bool,
    /// Allow `edit`.
    #[serde(default)]
    pub edit: bool,
    /// Allow `delete`.
    #[serde(default)]
    pub delete: bool,
    /// Allow `manage`.
    #[serde(default)]
    pub manage: bool,
}

impl ActionFlags {
    /// All five flags denied.
    pub const NONE: ActionFlags = ActionFlags {
        view: false,
        create: false,
        edit: false,
        delete: false,
        manage: false,
    };

    /// All five flags granted.
    pub const FULL: ActionFlags = ActionFlags {
        view: true,
        create: true,
        edit: true,
        delete: true,
        manage: true,
    };

    /// The flag for one action.
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.view,
            Action::Create => self.create,
            Action::Edit => self.edit,
            Action::Delete => self.delete,
            Action::Manage => self.manage,
        }
    }

    /// Copy of this record with one action granted.
    pub fn allowing(mut self, action: Action) -> Self {
        match action {
            Action::View => self.view = true,
            Action::Create => self.create = true,
            Action::Edit => self.edit = true,
            Action::Delete => self.delete = true,
            Action::Manage => self.manage = true,
        }
        self
    }
}

/// Error produced by the fail-loud override parsing path used on
/// administrative writes. Runtime merging never surfaces it.
#[derive(Debug, Error)]
pub enum OverrideParseError {
    /// Blob is not a JSON object of category path to flag record.
    #[error("override blob is not a valid permission document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sparse override document as persisted for a role: only the categories an
/// administrator touched, each with a complete flag record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(BTreeMap<CategoryPath, ActionFlags>);

impl Overrides {
    /// Parse a stored blob, rejecting anything that is not a JSON object of
    /// path to flag records.
    pub fn parse(blob: &str) -> Result<Self, OverrideParseError> {
        Ok(serde_json::from_str(blob)?)
    }

    /// Add or replace the record for one path.
    pub fn set(&mut self, path: CategoryPath, flags: ActionFlags) {
        self.0.insert(path, flags);
    }

    /// Iterate the override paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &CategoryPath> {
        self.0.keys()
    }

    /// Override paths not declared by the catalogue. Such paths are stored
    /// and resolvable but unreachable by catalogue-driven route checks.
    pub fn unknown_paths<'a>(
        &'a self,
        catalog: &'a CategoryCatalog,
    ) -> impl Iterator<Item = &'a CategoryPath> {
        self.0.keys().filter(|path| !catalog.contains(path))
    }

    /// Number of override entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical JSON form, suitable for storage as a role's blob.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).expect("override document serializes to JSON")
    }
}

/// Resolved permission state for one role: category path to action flags.
///
/// The map carries two layers. The content layer is total: after
/// construction from a catalogue every known path has an entry, all-`false`
/// unless an override replaced it, and `get`/`to_json` answer from it. The
/// configured layer records which paths a merge (or explicit `insert`)
/// actually touched; the resolver's fallback walk consults only those, so
/// an untouched default entry never shadows an ancestor grant while an
/// explicit record at any depth settles the decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionMap {
    entries: BTreeMap<CategoryPath, ActionFlags>,
    #[serde(skip)]
    configured: BTreeSet<CategoryPath>,
}

impl PermissionMap {
    /// One all-`false` entry per catalogue path, none of them configured.
    /// Never fails.
    pub fn defaults(catalog: &CategoryCatalog) -> Self {
        Self {
            entries: catalog
                .paths()
                .map(|path| (path.clone(), ActionFlags::NONE))
                .collect(),
            configured: BTreeSet::new(),
        }
    }

    /// Merge a stored override blob onto `base`.
    ///
    /// Paths present in the blob replace their whole flag record and become
    /// configured (override wins); paths absent keep the base record; paths
    /// unknown to the catalogue are accepted and stored. A missing or
    /// malformed blob leaves the base untouched: evaluation degrades to the
    /// defaults rather than failing.
    pub fn merged(base: &PermissionMap, override_blob: Option<&str>) -> PermissionMap {
        let Some(blob) = override_blob else {
            return base.clone();
        };
        match Overrides::parse(blob) {
            Ok(overrides) => {
                let mut merged = base.clone();
                merged.apply(overrides);
                merged
            }
            Err(err) => {
                debug!(error = %err, "override blob rejected, keeping base map");
                base.clone()
            }
        }
    }

    /// Apply a parsed override document, replacing whole records per path
    /// and marking each touched path as configured.
    pub fn apply(&mut self, overrides: Overrides) {
        for (path, flags) in overrides.0 {
            self.configured.insert(path.clone());
            self.entries.insert(path, flags);
        }
    }

    /// The flag record stored for an exact path, if any. Default entries
    /// answer here too.
    pub fn get(&self, path: &CategoryPath) -> Option<&ActionFlags> {
        self.entries.get(path)
    }

    /// The record for an exact path only when something configured it. The
    /// fallback walk keys off this, not [`PermissionMap::get`].
    pub fn configured(&self, path: &CategoryPath) -> Option<&ActionFlags> {
        if self.configured.contains(path) {
            self.entries.get(path)
        } else {
            None
        }
    }

    /// Insert or replace the record for one path, marking it configured.
    pub fn insert(&mut self, path: CategoryPath, flags: ActionFlags) {
        self.configured.insert(path.clone());
        self.entries.insert(path, flags);
    }

    /// Iterate entries in sorted path order.
    pub fn entries(&self) -> impl Iterator<Item = (&CategoryPath, &ActionFlags)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical JSON form of the full map (defaults and overrides
    /// together), used when persisting administrative edits.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries).expect("permission map serializes to JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryCatalog;

    fn catalog() -> &'static CategoryCatalog {
        CategoryCatalog::builtin()
    }

    #[test]
    fn defaults_cover_every_catalogue_path() {
        let map = PermissionMap::defaults(catalog());
        assert_eq!(map.len(), catalog().len());
        for (path, flags) in map.entries() {
            assert_eq!(*flags, ActionFlags::NONE);
            assert!(map.configured(path).is_none());
        }
    }

    #[test]
    fn merge_replaces_whole_records_and_keeps_defaults() {
        let defaults = PermissionMap::defaults(catalog());
        let blob = r#"{"HR": {"view": true}}"#;
        let merged = PermissionMap::merged(&defaults, Some(blob));

        let hr = merged.get(&CategoryPath::new("HR")).unwrap();
        assert!(hr.view);
        // Flags omitted from an override entry are false, not inherited.
        assert!(!hr.create);
        assert!(!hr.manage);
        assert!(merged.configured(&CategoryPath::new("HR")).is_some());

        let finance = merged.get(&CategoryPath::new("Finance")).unwrap();
        assert_eq!(*finance, ActionFlags::NONE);
        assert!(merged.configured(&CategoryPath::new("Finance")).is_none());
        assert_eq!(merged.len(), defaults.len());
    }

    #[test]
    fn merge_accepts_paths_outside_the_catalogue() {
        let defaults = PermissionMap::defaults(catalog());
        let blob = r#"{"HR.Recruiting": {"view": true, "create": true}}"#;
        let merged = PermissionMap::merged(&defaults, Some(blob));
        let flags = merged.get(&CategoryPath::new("HR.Recruiting")).unwrap();
        assert!(flags.view && flags.create);
        assert_eq!(merged.len(), defaults.len() + 1);
    }

    #[test]
    fn malformed_blob_degrades_to_base() {
        let defaults = PermissionMap::defaults(catalog());
        for blob in ["{not json", "[1, 2, 3]", "42", "\"HR\"", "null"] {
            let merged = PermissionMap::merged(&defaults, Some(blob));
            assert_eq!(merged, defaults, "blob {blob:?} must leave base unchanged");
        }
    }

    #[test]
    fn absent_blob_keeps_base() {
        let defaults = PermissionMap::defaults(catalog());
        assert_eq!(PermissionMap::merged(&defaults, None), defaults);
    }

    #[test]
    fn serialized_map_covers_defaults_and_overrides() {
        let defaults = PermissionMap::defaults(catalog());
        let blob = r#"{"HR.Attendance.Records": {"view": true, "create": true}}"#;
        let merged = PermissionMap::merged(&defaults, Some(blob));

        let value: serde_json::Value = serde_json::from_str(&merged.to_json()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), merged.len());
        assert_eq!(object["HR.Attendance.Records"]["view"], true);
        assert_eq!(object["HR.Attendance.Records"]["manage"], false);
        assert_eq!(object["Finance"]["view"], false);
    }

    #[test]
    fn fail_loud_parse_reports_malformed_blobs() {
        assert!(Overrides::parse("{not json").is_err());
        assert!(Overrides::parse(r#"{"HR": {"view": true}}"#).is_ok());
    }

    #[test]
    fn unknown_path_report_lists_only_undeclared() {
        let overrides =
            Overrides::parse(r#"{"HR": {"view": true}, "Warehouse": {"view": true}}"#).unwrap();
        let unknown: Vec<_> = overrides
            .unknown_paths(catalog())
            .map(|path| path.as_str().to_string())
            .collect();
        assert_eq!(unknown, vec!["Warehouse".to_string()]);
    }
}
