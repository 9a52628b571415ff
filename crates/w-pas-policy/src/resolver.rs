//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use crate::catalog::{Action, CategoryPath};
use crate::map::PermissionMap;

/// A permission key split into its category path and trailing action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionKey {
    /// Leading path segments, rejoined.
    pub path: CategoryPath,
    /// Trailing action segment.
    pub action: Action,
}

impl PermissionKey {
    /// Parse `Segment("."Segment)* "." action`.
    ///
    /// Empty segments are discarded. Keys with fewer than two remaining
    /// segments, or whose final segment is not one of the five actions,
    /// yield `None` and therefore deny.
    pub fn parse(key: &str) -> Option<Self> {
        let segments: Vec<&str> = key.split('.').filter(|s| !s.is_empty()).collect();
        let (action_raw, path_segments) = segments.split_last()?;
        if path_segments.is_empty() {
            return None;
        }
        let action = action_raw.parse::<Action>().ok()?;
        Some(Self {
            path: CategoryPath::new(path_segments.join(".")),
            action,
        })
    }
}

/// Decide a permission key against a resolved map with
/// most-specific-prefix matching.
///
/// The walk starts at the full category path and moves to the parent when
/// the current path has no configured record. A configured record at any
/// depth settles the decision immediately, even when its flag is `false`:
/// an explicit record always beats a coarser ancestor grant. Untouched
/// default entries never stop the walk; when no prefix carries a configured
/// record the default floor denies. Invalid keys deny.
pub fn evaluate(map: &PermissionMap, key: &str) -> bool {
    match PermissionKey::parse(key) {
        Some(parsed) => evaluate_key(map, &parsed),
        None => false,
    }
}

/// [`evaluate`] for an already-parsed key.
pub fn evaluate_key(map: &PermissionMap, key: &PermissionKey) -> bool {
    let mut candidate = Some(key.path.clone());
    while let Some(path) = candidate {
        if let Some(flags) = map.configured(&path) {
            return flags.allows(key.action);
        }
        candidate = path.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryCatalog;
    use crate::map::{ActionFlags, PermissionMap};

    fn map_with(entries: &[(&str, ActionFlags)]) -> PermissionMap {
        let mut map = PermissionMap::default();
        for (path, flags) in entries {
            map.insert(CategoryPath::new(*path), *flags);
        }
        map
    }

    #[test]
    fn key_parsing_discards_empty_segments() {
        let key = PermissionKey::parse("HR..Attendance.view").unwrap();
        assert_eq!(key.path.as_str(), "HR.Attendance");
        assert_eq!(key.action, Action::View);
    }

    #[test]
    fn key_without_a_path_is_rejected() {
        assert!(PermissionKey::parse("view").is_none());
        assert!(PermissionKey::parse(".view").is_none());
        assert!(PermissionKey::parse("").is_none());
        assert!(PermissionKey::parse("...").is_none());
    }

    #[test]
    fn key_with_unknown_action_is_rejected() {
        assert!(PermissionKey::parse("HR.approve").is_none());
        assert!(PermissionKey::parse("HR.Attendance.export").is_none());
    }

    #[test]
    fn action_segment_is_case_insensitive() {
        let key = PermissionKey::parse("HR.Payroll.VIEW").unwrap();
        assert_eq!(key.action, Action::View);
    }

    #[test]
    fn exact_entry_wins_over_ancestor() {
        let map = map_with(&[
            ("HR", ActionFlags::NONE.allowing(Action::View)),
            ("HR.Payroll", ActionFlags::NONE),
        ]);
        assert!(!evaluate(&map, "HR.Payroll.view"));
        assert!(evaluate(&map, "HR.view"));
    }

    #[test]
    fn explicit_false_stops_the_fallback_walk() {
        // A present-but-false entry at the middle depth must shadow the
        // grant at the root.
        let map = map_with(&[
            ("A", ActionFlags::FULL),
            ("A.B", ActionFlags::NONE),
        ]);
        assert!(!evaluate(&map, "A.B.C.view"));
    }

    #[test]
    fn absent_entries_fall_back_to_nearest_ancestor() {
        let map = map_with(&[("HR.Payroll", ActionFlags::NONE.allowing(Action::View))]);
        assert!(evaluate(&map, "HR.Payroll.Details.view"));
        assert!(!evaluate(&map, "HR.Payroll.Details.edit"));
    }

    #[test]
    fn no_entry_at_any_depth_denies() {
        let map = map_with(&[("Finance", ActionFlags::FULL)]);
        assert!(!evaluate(&map, "HR.Attendance.view"));
    }

    #[test]
    fn untouched_default_entries_do_not_stop_the_walk() {
        // HR.Payroll.Details has a default all-false entry, but only the
        // HR.Payroll record was configured, so the deeper key inherits it.
        let defaults = PermissionMap::defaults(CategoryCatalog::builtin());
        let map = PermissionMap::merged(&defaults, Some(r#"{"HR.Payroll": {"view": true}}"#));
        assert!(map.get(&CategoryPath::new("HR.Payroll.Details")).is_some());
        assert!(evaluate(&map, "HR.Payroll.Details.view"));
        assert!(!evaluate(&map, "HR.Payroll.Details.edit"));
    }

    #[test]
    fn invalid_keys_deny_even_on_a_full_grant_map() {
        let defaults = PermissionMap::defaults(CategoryCatalog::builtin());
        let mut map = PermissionMap::default();
        for (path, _) in defaults.entries() {
            map.insert(path.clone(), ActionFlags::FULL);
        }
        assert!(!evaluate(&map, "view"));
        assert!(!evaluate(&map, ""));
        assert!(!evaluate(&map, "Dashboard"));
    }

    #[test]
    fn path_segments_stay_case_sensitive() {
        let map = map_with(&[("HR", ActionFlags::FULL)]);
        assert!(evaluate(&map, "HR.view"));
        assert!(!evaluate(&map, "hr.view"));
    }
}
