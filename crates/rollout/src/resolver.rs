//! Tenant rollout resolution.
//!
//! Provides [`resolve_rollout`] and the [`RolloutResolver`] wrapper, which
//! decide per tenant whether the rollout is enabled and which surfaces it
//! exposes.
//!
//! # Precedence
//!
//! 1. Local override for the tenant (always enabled, surfaces as stored)
//! 2. Force-disable list or ineligibility (everything disabled)
//! 3. Per-tenant surface list, else the global surface list
//!
//! A tenant is eligible when the rollout is globally enabled and either no
//! canary list is configured or the tenant is on it, or when the tenant is
//! force-enabled.

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::RolloutConfig;
use crate::overrides::LocalOverrides;
use crate::source::DecisionSource;
use crate::store::{NoOverrideStore, OverrideStore};
use crate::surface::{Surface, SurfaceFlags};
use crate::tenant::TenantId;

/// The outcome of resolving a tenant's rollout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutDecision {
    /// The normalized tenant.
    pub tenant: TenantId,
    /// Whether any rollout surface may be shown.
    pub enabled: bool,
    /// Canary list membership, independent of the outcome.
    pub is_canary_tenant: bool,
    /// The rule that produced this decision.
    pub source: DecisionSource,
    /// Per-surface enablement.
    pub surfaces: SurfaceFlags,
}

impl RolloutDecision {
    /// Returns true if `surface` should be rendered for this tenant.
    pub fn is_enabled(&self, surface: Surface) -> bool {
        self.enabled && self.surfaces.get(surface)
    }

    fn disabled(tenant: TenantId, is_canary_tenant: bool) -> Self {
        Self {
            tenant,
            enabled: false,
            is_canary_tenant,
            source: DecisionSource::Global,
            surfaces: SurfaceFlags::all_disabled(),
        }
    }
}

/// Resolves the rollout decision for a raw tenant slug.
///
/// The slug is trimmed and lowercased; an absent slug resolves as the empty
/// tenant. This function reads `store` but never writes it and has no error
/// path.
///
/// # Examples
///
/// ```
/// use dpp_rollout::{NoOverrideStore, RolloutConfig, resolve_rollout};
///
/// let config = RolloutConfig::default().with_canary(["canary-a"]);
///
/// let decision = resolve_rollout(Some("  Canary-A "), &config, &NoOverrideStore);
/// assert!(decision.enabled);
/// assert!(decision.is_canary_tenant);
///
/// let decision = resolve_rollout(Some("default"), &config, &NoOverrideStore);
/// assert!(!decision.enabled);
/// ```
pub fn resolve_rollout(
    raw_tenant: Option<&str>,
    config: &RolloutConfig,
    store: &dyn OverrideStore,
) -> RolloutDecision {
    let tenant = TenantId::from_raw(raw_tenant);
    let is_canary_tenant = config.is_canary(&tenant);
    let effective_enabled = config.is_eligible(&tenant);

    if let Some(surfaces) = LocalOverrides::load(store).get(&tenant) {
        debug!(tenant = %tenant, ?surfaces, "Rollout pinned by local override");
        return RolloutDecision {
            tenant,
            enabled: true,
            is_canary_tenant,
            source: DecisionSource::Override,
            surfaces,
        };
    }

    if !effective_enabled || config.force_disabled_tenants.contains(&tenant) {
        trace!(
            tenant = %tenant,
            eligible = effective_enabled,
            "Rollout disabled for tenant"
        );
        return RolloutDecision::disabled(tenant, is_canary_tenant);
    }

    let base_surfaces = config
        .tenant_surface_overrides
        .get(&tenant)
        .unwrap_or(&config.global_surfaces);
    let source = if is_canary_tenant {
        DecisionSource::Canary
    } else {
        DecisionSource::Global
    };

    trace!(tenant = %tenant, %source, "Rollout enabled for tenant");
    RolloutDecision {
        surfaces: SurfaceFlags::from_surfaces(base_surfaces),
        tenant,
        enabled: true,
        is_canary_tenant,
        source,
    }
}

/// Owns a configuration and an override store and resolves decisions
/// against them.
pub struct RolloutResolver {
    config: RolloutConfig,
    store: Box<dyn OverrideStore>,
}

impl RolloutResolver {
    /// Creates a resolver without local overrides.
    pub fn new(config: RolloutConfig) -> Self {
        Self::with_store(config, NoOverrideStore)
    }

    /// Creates a resolver that consults `store` for local overrides.
    pub fn with_store(config: RolloutConfig, store: impl OverrideStore + 'static) -> Self {
        for finding in config.lint() {
            tracing::warn!("{}", finding);
        }
        Self {
            config,
            store: Box::new(store),
        }
    }

    /// Creates a resolver from environment configuration.
    pub fn from_env() -> Self {
        Self::new(RolloutConfig::from_env())
    }

    pub fn config(&self) -> &RolloutConfig {
        &self.config
    }

    /// Resolves the decision for a raw tenant slug.
    pub fn resolve(&self, raw_tenant: Option<&str>) -> RolloutDecision {
        resolve_rollout(raw_tenant, &self.config, &*self.store)
    }
}

impl Default for RolloutResolver {
    fn default() -> Self {
        Self::new(RolloutConfig::default())
    }
}

impl std::fmt::Debug for RolloutResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RolloutResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
