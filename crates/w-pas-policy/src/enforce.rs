//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::bypass;
use crate::map::PermissionMap;
use crate::resolver;

/// Reason attached to every authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// The operation declares no permission requirement.
    NoRestriction,
    /// The actor's role is in the compiled bypass set.
    RoleBypass,
    /// The resolver granted the requested key.
    PermissionGranted,
    /// The resolver denied the requested key.
    PermissionDenied,
    /// No authenticated actor was supplied.
    Unauthenticated,
}

impl DecisionReason {
    /// Wire-format name, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::NoRestriction => "no_restriction",
            DecisionReason::RoleBypass => "role_bypass",
            DecisionReason::PermissionGranted => "permission_granted",
            DecisionReason::PermissionDenied => "permission_denied",
            DecisionReason::Unauthenticated => "unauthenticated",
        }
    }
}

/// Outcome of a single authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the operation may proceed.
    pub allow: bool,
    /// Why the decision came out this way.
    pub reason: DecisionReason,
}

impl Decision {
    /// An allowing decision.
    pub const fn allowed(reason: DecisionReason) -> Self {
        Self {
            allow: true,
            reason,
        }
    }

    /// A denying decision.
    pub const fn denied(reason: DecisionReason) -> Self {
        Self {
            allow: false,
            reason,
        }
    }
}

/// The single enforcement entry point invoked once per protected operation.
///
/// Evaluation order: an operation with no declared key is open to any
/// caller; an operation with a key requires an actor; bypass roles are
/// consulted before the stored map so they cannot be locked out by map
/// misconfiguration; everything else goes through the resolver. A missing
/// map evaluates as the all-deny defaults.
pub fn authorize(
    actor_role: Option<&str>,
    map: Option<&PermissionMap>,
    required_key: Option<&str>,
) -> Decision {
    let key = match required_key {
        Some(key) if !key.trim().is_empty() => key,
        _ => return Decision::allowed(DecisionReason::NoRestriction),
    };
    let role = match actor_role {
        Some(role) if !role.trim().is_empty() => role,
        _ => return Decision::denied(DecisionReason::Unauthenticated),
    };
    if bypass::is_bypass_role(role) {
        return Decision::allowed(DecisionReason::RoleBypass);
    }
    let allow = map
        .map(|map| resolver::evaluate(map, key))
        .unwrap_or(false);
    if allow {
        Decision::allowed(DecisionReason::PermissionGranted)
    } else {
        Decision::denied(DecisionReason::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Action, CategoryCatalog, CategoryPath};
    use crate::map::{ActionFlags, PermissionMap};

    fn granting_map(path: &str, action: Action) -> PermissionMap {
        let mut map = PermissionMap::defaults(CategoryCatalog::builtin());
        map.insert(CategoryPath::new(path), ActionFlags::NONE.allowing(action));
        map
    }

    #[test]
    fn missing_key_is_open_to_any_caller() {
        let decision = authorize(Some("HR Officer"), None, None);
        assert!(decision.allow);
        assert_eq!(decision.reason, DecisionReason::NoRestriction);

        let blank = authorize(Some("HR Officer"), None, Some("   "));
        assert_eq!(blank.reason, DecisionReason::NoRestriction);
    }

    #[test]
    fn missing_actor_fails_before_map_lookup() {
        let decision = authorize(None, None, Some("HR.view"));
        assert!(!decision.allow);
        assert_eq!(decision.reason, DecisionReason::Unauthenticated);

        let blank = authorize(Some(""), None, Some("HR.view"));
        assert_eq!(blank.reason, DecisionReason::Unauthenticated);
    }

    #[test]
    fn bypass_wins_over_an_all_deny_map() {
        let defaults = PermissionMap::defaults(CategoryCatalog::builtin());
        for role in ["admin", "Super Admin", "team  leader"] {
            let decision = authorize(Some(role), Some(&defaults), Some("HR.Payroll.manage"));
            assert!(decision.allow, "{role} must bypass");
            assert_eq!(decision.reason, DecisionReason::RoleBypass);
        }
    }

    #[test]
    fn resolver_outcome_maps_to_granted_or_denied() {
        let map = granting_map("HR", Action::View);
        let granted = authorize(Some("HR Officer"), Some(&map), Some("HR.Employees.view"));
        assert!(granted.allow);
        assert_eq!(granted.reason, DecisionReason::PermissionGranted);

        let denied = authorize(Some("HR Officer"), Some(&map), Some("HR.Employees.edit"));
        assert!(!denied.allow);
        assert_eq!(denied.reason, DecisionReason::PermissionDenied);
    }

    #[test]
    fn missing_map_evaluates_as_defaults() {
        let decision = authorize(Some("HR Officer"), None, Some("Dashboard.view"));
        assert!(!decision.allow);
        assert_eq!(decision.reason, DecisionReason::PermissionDenied);
    }

    #[test]
    fn reason_serializes_in_snake_case() {
        let decision = Decision::denied(DecisionReason::PermissionDenied);
        let json = serde_json::to_string(&decision).unwrap();
        assert_eq!(json, r#"{"allow":false,"reason":"permission_denied"}"#);
    }
}
