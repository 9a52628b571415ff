//! ---
//! pas_section: "02-permission-resolution"
//! pas_subsection: "module"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Hierarchical permission resolution, role directory, and decision auditing."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use std::sync::Arc;

use prometheus::{IntCounter, Registry};

use crate::enforce::{Decision, DecisionReason};

/// Authorization metrics exported via Prometheus.
#[derive(Clone)]
pub struct AccessMetrics {
    registry: Arc<Registry>,
    authz_checks_total: IntCounter,
    authz_denials_total: IntCounter,
    authz_bypass_total: IntCounter,
}

impl AccessMetrics {
    /// Register metrics with the provided registry.
    pub fn new(registry: Arc<Registry>) -> anyhow::Result<Self> {
        let authz_checks_total =
            IntCounter::new("authz_checks_total", "Total authorization decisions produced")?;
        let authz_denials_total =
            IntCounter::new("authz_denials_total", "Authorization decisions that denied")?;
        let authz_bypass_total = IntCounter::new(
            "authz_bypass_total",
            "Authorization decisions granted through the role bypass set",
        )?;

        registry.register(Box::new(authz_checks_total.clone()))?;
        registry.register(Box::new(authz_denials_total.clone()))?;
        registry.register(Box::new(authz_bypass_total.clone()))?;

        Ok(Self {
            registry,
            authz_checks_total,
            authz_denials_total,
            authz_bypass_total,
        })
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record one produced decision.
    pub fn record(&self, decision: &Decision) {
        self.authz_checks_total.inc();
        if !decision.allow {
            self.authz_denials_total.inc();
        }
        if decision.reason == DecisionReason::RoleBypass {
            self.authz_bypass_total.inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_increment_the_right_counters() {
        let registry = Arc::new(Registry::new());
        let metrics = AccessMetrics::new(registry.clone()).unwrap();
        metrics.record(&Decision::allowed(DecisionReason::PermissionGranted));
        metrics.record(&Decision::denied(DecisionReason::PermissionDenied));
        metrics.record(&Decision::allowed(DecisionReason::RoleBypass));

        assert_eq!(metrics.authz_checks_total.get(), 3);
        assert_eq!(metrics.authz_denials_total.get(), 1);
        assert_eq!(metrics.authz_bypass_total.get(), 1);
        assert_eq!(registry.gather().len(), 3);
    }
}
