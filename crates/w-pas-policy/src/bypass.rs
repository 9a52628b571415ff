//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

/// Privileged roles that skip permission-map resolution entirely.
///
/// Membership is compiled in and unreachable from the permission-editing
/// surface, so a bypass role can never be locked out by a misconfigured
/// map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BypassRole {
    /// Platform administrator.
    Admin,
    /// Unrestricted super administrator.
    SuperAdmin,
    /// Operational team leadership tier.
    TeamLeader,
}

impl BypassRole {
    /// All bypass roles.
    pub const ALL: [BypassRole; 3] = [
        BypassRole::Admin,
        BypassRole::SuperAdmin,
        BypassRole::TeamLeader,
    ];

    /// Canonical normalized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BypassRole::Admin => "ADMIN",
            BypassRole::SuperAdmin => "SUPER_ADMIN",
            BypassRole::TeamLeader => "TEAM_LEADER",
        }
    }

    /// Match an already-normalized name against the bypass set.
    pub fn from_normalized(name: &str) -> Option<Self> {
        BypassRole::ALL
            .into_iter()
            .find(|role| role.as_str() == name)
    }
}

impl fmt::Display for BypassRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a role name for bypass comparison: trim, collapse internal
/// whitespace runs to a single underscore, upper-case.
///
/// `"Team Leader"`, `"TEAM_LEADER"`, and `"team  leader"` all normalize to
/// `TEAM_LEADER`.
pub fn normalize_role(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Whether a raw role name normalizes into the bypass set.
pub fn is_bypass_role(name: &str) -> bool {
    BypassRole::from_normalized(&normalize_role(name)).is_some()
}
