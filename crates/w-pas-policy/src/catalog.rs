//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category paths compiled into every deployment. A catalogue file named in
/// the daemon configuration replaces this set at startup.
const BUILTIN_PATHS: &[&str] = &[
    "Dashboard",
    "Finance",
    "HR",
    "Projects",
    "Admin",
    "Analytics",
    "HR.Employees",
    "HR.Employees.Details",
    "HR.Attendance",
    "HR.Attendance.Entry",
    "HR.Attendance.Records",
    "HR.Attendance.ManpowerSupplier",
    "HR.Payroll",
    "HR.Payroll.Details",
];

static BUILTIN: Lazy<CategoryCatalog> = Lazy::new(|| {
    CategoryCatalog::from_paths(BUILTIN_PATHS.iter().map(|path| CategoryPath::new(*path)))
});

/// Action enumerates the five operation kinds a permission flag applies to.
///
/// Parsing is ASCII-case-insensitive; the canonical form is lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Open or read the category.
    View,
    /// Create records under the category.
    Create,
    /// Modify existing records under the category.
    Edit,
    /// Remove records under the category.
    Delete,
    /// Administer the category itself.
    Manage,
}

impl Action {
    /// All actions in canonical order.
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Manage,
    ];

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "view" => Ok(Action::View),
            "create" => Ok(Action::Create),
            "edit" => Ok(Action::Edit),
            "delete" => Ok(Action::Delete),
            "manage" => Ok(Action::Manage),
            _ => Err(CatalogError::UnknownAction(value.to_string())),
        }
    }
}

/// Errors raised by catalogue lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Segment does not name one of the five known actions.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// Dotted hierarchical identifier for a protected resource category.
///
/// Segments are case-sensitive. `HR.Attendance.Records` is a descendant of
/// `HR.Attendance`, which is a descendant of `HR`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryPath(String);

impl CategoryPath {
    /// Wrap a dotted path string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The raw dotted form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the path segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The immediate ancestor, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<CategoryPath> {
        self.0
            .rsplit_once('.')
            .map(|(head, _)| CategoryPath::new(head))
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryPath {
    fn from(path: &str) -> Self {
        CategoryPath::new(path)
    }
}

/// On-disk catalogue document (`paths = ["Dashboard", "HR", ...]`).
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    paths: Vec<String>,
}

/// The canonical set of category paths recognised by a deployment.
///
/// Built once at process start (built-in seed or catalogue file) and shared
/// immutably behind an `Arc`; evaluation never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    paths: BTreeSet<CategoryPath>,
}

impl CategoryCatalog {
    /// The compiled-in seed catalogue.
    pub fn builtin() -> &'static CategoryCatalog {
        &BUILTIN
    }

    /// Build a catalogue from an explicit path collection.
    pub fn from_paths(paths: impl IntoIterator<Item = CategoryPath>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Load a catalogue from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("unable to read catalogue file {}", path.display()))?;
        let file: CatalogFile = toml::from_str(&raw)
            .with_context(|| format!("invalid catalogue file {}", path.display()))?;
        if file.paths.is_empty() {
            bail!("catalogue file {} declares no paths", path.display());
        }
        Ok(Self::from_paths(file.paths.into_iter().map(CategoryPath::new)))
    }

    /// Whether the catalogue declares the exact path.
    pub fn contains(&self, path: &CategoryPath) -> bool {
        self.paths.contains(path)
    }

    /// Iterate the declared paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &CategoryPath> {
        self.paths.iter()
    }

    /// Number of declared paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn action_parse_is_case_insensitive() {
        assert_eq!("view".parse::<Action>().unwrap(), Action::View);
        assert_eq!("MANAGE".parse::<Action>().unwrap(), Action::Manage);
        assert_eq!("Edit".parse::<Action>().unwrap(), Action::Edit);
        assert!("approve".parse::<Action>().is_err());
    }

    #[test]
    fn action_roundtrips_through_display() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn path_parent_walks_to_root() {
        let path = CategoryPath::new("HR.Attendance.Records");
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "HR.Attendance");
        let grandparent = parent.parent().unwrap();
        assert_eq!(grandparent.as_str(), "HR");
        assert!(grandparent.parent().is_none());
    }

    #[test]
    fn builtin_catalog_contains_seed_paths() {
        let catalog = CategoryCatalog::builtin();
        assert_eq!(catalog.len(), 14);
        assert!(catalog.contains(&CategoryPath::new("Dashboard")));
        assert!(catalog.contains(&CategoryPath::new("HR.Payroll.Details")));
        assert!(!catalog.contains(&CategoryPath::new("HR.Recruiting")));
    }

    #[test]
    fn catalogue_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "paths = [\"Ops\", \"Ops.Fleet\", \"Finance\"]").unwrap();
        let catalog = CategoryCatalog::from_toml_file(&path).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains(&CategoryPath::new("Ops.Fleet")));
    }

    #[test]
    fn empty_catalogue_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "paths = []").unwrap();
        assert!(CategoryCatalog::from_toml_file(&path).is_err());
    }
}
