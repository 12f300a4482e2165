//! Rollout configuration.
//!
//! Configuration is read once at process start and handed to the resolver
//! explicitly. It comes in two layers:
//!
//! - [`RolloutSettings`]: the raw, string-typed values as delivered by the
//!   environment or command line.
//! - [`RolloutConfig`]: the typed configuration produced from the settings by
//!   the tolerant parsers in [`crate::parse`].
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DPP_ROLLOUT_ENABLED` | true | Master switch |
//! | `DPP_ROLLOUT_SURFACES` | publisher,editor,viewer | Surfaces enabled by default |
//! | `DPP_ROLLOUT_CANARY_TENANTS` | (empty) | Canary allow-list; restricts eligibility when set |
//! | `DPP_ROLLOUT_FORCE_ENABLE_TENANTS` | (empty) | Tenants that bypass the canary restriction |
//! | `DPP_ROLLOUT_FORCE_DISABLE_TENANTS` | (empty) | Tenants that are always disabled |
//! | `DPP_ROLLOUT_TENANT_SURFACES` | {} | JSON object of per-tenant surface lists |
//!
//! # Example
//!
//! ```rust
//! use dpp_rollout::{RolloutConfig, RolloutSettings};
//!
//! // Create from environment
//! let config = RolloutConfig::from_env();
//!
//! // Or from explicit settings
//! let settings = RolloutSettings {
//!     canary_tenants: "canary-a,canary-b".to_string(),
//!     ..Default::default()
//! };
//! let config = RolloutConfig::from_settings(&settings);
//! assert_eq!(config.canary_tenants.len(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use clap::Parser;
use serde::Serialize;

use crate::parse::{
    DEFAULT_SURFACES, parse_bool_flag, parse_surface_list, parse_tenant_list,
    parse_tenant_surface_overrides,
};
use crate::surface::Surface;
use crate::tenant::TenantId;

/// Raw rollout settings.
///
/// Every value is kept as a string so that malformed input is handled by the
/// tolerant parsers rather than rejected at the argument layer.
#[derive(Debug, Clone, Parser)]
#[command(name = "dpp-rollout")]
pub struct RolloutSettings {
    /// Master rollout switch (1/true/yes/on or 0/false/no/off).
    #[arg(long = "rollout-enabled", env = "DPP_ROLLOUT_ENABLED", default_value = "true")]
    pub enabled: String,

    /// Surfaces enabled by default (comma-separated).
    #[arg(long = "rollout-surfaces", env = "DPP_ROLLOUT_SURFACES", default_value = DEFAULT_SURFACES)]
    pub surfaces: String,

    /// Canary tenants (comma-separated). When non-empty, only these tenants are eligible.
    #[arg(long = "canary-tenants", env = "DPP_ROLLOUT_CANARY_TENANTS", default_value = "")]
    pub canary_tenants: String,

    /// Tenants enabled regardless of the canary list (comma-separated).
    #[arg(
        long = "force-enable-tenants",
        env = "DPP_ROLLOUT_FORCE_ENABLE_TENANTS",
        default_value = ""
    )]
    pub force_enable_tenants: String,

    /// Tenants that are always disabled (comma-separated).
    #[arg(
        long = "force-disable-tenants",
        env = "DPP_ROLLOUT_FORCE_DISABLE_TENANTS",
        default_value = ""
    )]
    pub force_disable_tenants: String,

    /// Per-tenant surface lists as a JSON object.
    #[arg(long = "tenant-surfaces", env = "DPP_ROLLOUT_TENANT_SURFACES", default_value = "{}")]
    pub tenant_surfaces: String,
}

impl Default for RolloutSettings {
    fn default() -> Self {
        Self {
            enabled: "true".to_string(),
            surfaces: DEFAULT_SURFACES.to_string(),
            canary_tenants: String::new(),
            force_enable_tenants: String::new(),
            force_disable_tenants: String::new(),
            tenant_surfaces: "{}".to_string(),
        }
    }
}

impl RolloutSettings {
    /// Reads settings from environment variables only.
    ///
    /// Process arguments are not consulted. If the environment cannot be
    /// parsed (for example a non UTF-8 value) the defaults are used.
    pub fn from_env() -> Self {
        Self::try_parse_from(["dpp-rollout"]).unwrap_or_default()
    }
}

/// Typed rollout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutConfig {
    /// Master switch.
    pub globally_enabled: bool,
    /// Surfaces enabled when no tenant-specific list applies.
    pub global_surfaces: BTreeSet<Surface>,
    /// When non-empty, restricts eligibility to these tenants.
    pub canary_tenants: BTreeSet<TenantId>,
    /// Tenants that bypass the canary restriction.
    pub force_enabled_tenants: BTreeSet<TenantId>,
    /// Tenants that are always disabled, short of a local override.
    pub force_disabled_tenants: BTreeSet<TenantId>,
    /// Per-tenant replacement for `global_surfaces`.
    pub tenant_surface_overrides: BTreeMap<TenantId, BTreeSet<Surface>>,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            globally_enabled: true,
            global_surfaces: Surface::ALL.into_iter().collect(),
            canary_tenants: BTreeSet::new(),
            force_enabled_tenants: BTreeSet::new(),
            force_disabled_tenants: BTreeSet::new(),
            tenant_surface_overrides: BTreeMap::new(),
        }
    }
}

impl RolloutConfig {
    /// Builds the typed configuration from raw settings.
    ///
    /// Never fails: malformed values fall back to their defaults.
    pub fn from_settings(settings: &RolloutSettings) -> Self {
        Self {
            globally_enabled: parse_bool_flag(Some(settings.enabled.as_str()), true),
            global_surfaces: parse_surface_list(Some(settings.surfaces.as_str())),
            canary_tenants: parse_tenant_list(Some(settings.canary_tenants.as_str())),
            force_enabled_tenants: parse_tenant_list(Some(settings.force_enable_tenants.as_str())),
            force_disabled_tenants: parse_tenant_list(Some(settings.force_disable_tenants.as_str())),
            tenant_surface_overrides: parse_tenant_surface_overrides(Some(
                settings.tenant_surfaces.as_str(),
            )),
        }
    }

    /// Builds the typed configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_settings(&RolloutSettings::from_env())
    }

    /// Sets the master switch.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.globally_enabled = enabled;
        self
    }

    /// Replaces the global surface set.
    pub fn with_global_surfaces(mut self, surfaces: impl IntoIterator<Item = Surface>) -> Self {
        self.global_surfaces = surfaces.into_iter().collect();
        self
    }

    /// Adds tenants to the canary list.
    pub fn with_canary<I, T>(mut self, tenants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TenantId>,
    {
        self.canary_tenants
            .extend(tenants.into_iter().map(Into::into));
        self
    }

    /// Adds tenants to the force-enable list.
    pub fn with_force_enabled<I, T>(mut self, tenants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TenantId>,
    {
        self.force_enabled_tenants
            .extend(tenants.into_iter().map(Into::into));
        self
    }

    /// Adds tenants to the force-disable list.
    pub fn with_force_disabled<I, T>(mut self, tenants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TenantId>,
    {
        self.force_disabled_tenants
            .extend(tenants.into_iter().map(Into::into));
        self
    }

    /// Sets the surface list for a single tenant.
    pub fn with_tenant_surfaces(
        mut self,
        tenant: impl Into<TenantId>,
        surfaces: impl IntoIterator<Item = Surface>,
    ) -> Self {
        self.tenant_surface_overrides
            .insert(tenant.into(), surfaces.into_iter().collect());
        self
    }

    /// Returns true if `tenant` is on the canary list.
    pub fn is_canary(&self, tenant: &TenantId) -> bool {
        self.canary_tenants.contains(tenant)
    }

    /// Returns true if the canary list restricts eligibility.
    pub fn is_canary_gated(&self) -> bool {
        !self.canary_tenants.is_empty()
    }

    /// Returns whether `tenant` is eligible before force-disable and local
    /// overrides are considered.
    pub fn is_eligible(&self, tenant: &TenantId) -> bool {
        (self.globally_enabled && !self.is_canary_gated())
            || self.force_enabled_tenants.contains(tenant)
            || (self.globally_enabled && self.is_canary(tenant))
    }

    /// Reports configuration that is accepted but probably unintended.
    ///
    /// Findings never affect resolution; callers typically log them.
    pub fn lint(&self) -> Vec<String> {
        let mut findings = Vec::new();

        for tenant in self
            .force_enabled_tenants
            .intersection(&self.force_disabled_tenants)
        {
            findings.push(format!(
                "Tenant '{}' is both force-enabled and force-disabled; force-disable wins",
                tenant
            ));
        }

        if !self.globally_enabled && self.is_canary_gated() {
            findings.push(
                "Canary tenants are configured but the rollout is globally disabled".to_string(),
            );
        }

        for tenant in self.tenant_surface_overrides.keys() {
            if self.force_disabled_tenants.contains(tenant) || !self.is_eligible(tenant) {
                findings.push(format!(
                    "Tenant '{}' has a surface override but is never enabled",
                    tenant
                ));
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RolloutConfig::default();
        assert!(config.globally_enabled);
        assert_eq!(config.global_surfaces.len(), 3);
        assert!(!config.is_canary_gated());
        assert!(config.tenant_surface_overrides.is_empty());
    }

    #[test]
    fn test_default_settings_match_default_config() {
        let config = RolloutConfig::from_settings(&RolloutSettings::default());
        assert_eq!(config, RolloutConfig::default());
    }

    #[test]
    fn test_from_settings_parses_every_field() {
        let settings = RolloutSettings {
            enabled: "No".to_string(),
            surfaces: "viewer, bogus".to_string(),
            canary_tenants: "Canary-A, canary-b".to_string(),
            force_enable_tenants: "vip".to_string(),
            force_disable_tenants: " blocked ".to_string(),
            tenant_surfaces: r#"{"Alpha": ["publisher"]}"#.to_string(),
        };
        let config = RolloutConfig::from_settings(&settings);

        assert!(!config.globally_enabled);
        assert_eq!(config.global_surfaces, BTreeSet::from([Surface::Viewer]));
        assert!(config.is_canary(&TenantId::new("canary-a")));
        assert!(config.is_canary(&TenantId::new("CANARY-B")));
        assert!(config.force_enabled_tenants.contains(&TenantId::new("vip")));
        assert!(
            config
                .force_disabled_tenants
                .contains(&TenantId::new("blocked"))
        );
        assert_eq!(
            config.tenant_surface_overrides[&TenantId::new("alpha")],
            BTreeSet::from([Surface::Publisher])
        );
    }

    #[test]
    fn test_malformed_settings_degrade_to_defaults() {
        let settings = RolloutSettings {
            enabled: "perhaps".to_string(),
            surfaces: "".to_string(),
            tenant_surfaces: "{\"alpha\": [".to_string(),
            ..Default::default()
        };
        let config = RolloutConfig::from_settings(&settings);
        assert_eq!(config, RolloutConfig::default());
    }

    #[test]
    fn test_settings_parse_from_args() {
        let settings = RolloutSettings::try_parse_from([
            "dpp-rollout",
            "--rollout-enabled",
            "off",
            "--canary-tenants",
            "alpha",
        ])
        .unwrap();
        assert_eq!(settings.enabled, "off");
        assert_eq!(settings.canary_tenants, "alpha");
        assert_eq!(settings.tenant_surfaces, "{}");
    }

    #[test]
    fn test_eligibility() {
        let open = RolloutConfig::default();
        assert!(open.is_eligible(&TenantId::new("anyone")));

        let gated = RolloutConfig::default()
            .with_canary(["alpha"])
            .with_force_enabled(["vip"]);
        assert!(gated.is_eligible(&TenantId::new("alpha")));
        assert!(gated.is_eligible(&TenantId::new("vip")));
        assert!(!gated.is_eligible(&TenantId::new("other")));

        let off = RolloutConfig::default()
            .with_enabled(false)
            .with_canary(["alpha"])
            .with_force_enabled(["vip"]);
        assert!(!off.is_eligible(&TenantId::new("alpha")));
        assert!(off.is_eligible(&TenantId::new("vip")));
    }

    #[test]
    fn test_lint_clean_config() {
        assert!(RolloutConfig::default().lint().is_empty());
    }

    #[test]
    fn test_lint_findings() {
        let config = RolloutConfig::default()
            .with_enabled(false)
            .with_canary(["alpha"])
            .with_force_enabled(["both"])
            .with_force_disabled(["both"])
            .with_tenant_surfaces("alpha", [Surface::Viewer]);

        let findings = config.lint();
        assert_eq!(findings.len(), 3);
        assert!(findings.iter().any(|f| f.contains("'both'")));
        assert!(findings.iter().any(|f| f.contains("globally disabled")));
        assert!(findings.iter().any(|f| f.contains("'alpha'")));
    }
}
