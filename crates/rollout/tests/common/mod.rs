//! Common test utilities for rollout resolution testing.
//!
//! Provides settings fixtures that mirror how configuration is delivered
//! (raw strings) and helpers for seeding local overrides.

#![allow(dead_code)]

use dpp_rollout::{
    LOCAL_OVERRIDE_KEY, MemoryOverrideStore, RolloutConfig, RolloutSettings, SurfaceFlags,
};

/// Builder for raw rollout settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsFixture {
    settings: RolloutSettings,
}

impl SettingsFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, raw: &str) -> Self {
        self.settings.enabled = raw.to_string();
        self
    }

    pub fn surfaces(mut self, raw: &str) -> Self {
        self.settings.surfaces = raw.to_string();
        self
    }

    pub fn canary(mut self, raw: &str) -> Self {
        self.settings.canary_tenants = raw.to_string();
        self
    }

    pub fn force_enable(mut self, raw: &str) -> Self {
        self.settings.force_enable_tenants = raw.to_string();
        self
    }

    pub fn force_disable(mut self, raw: &str) -> Self {
        self.settings.force_disable_tenants = raw.to_string();
        self
    }

    pub fn tenant_surfaces(mut self, raw: &str) -> Self {
        self.settings.tenant_surfaces = raw.to_string();
        self
    }

    pub fn config(&self) -> RolloutConfig {
        RolloutConfig::from_settings(&self.settings)
    }
}

/// Creates a store holding the given raw local override JSON.
pub fn override_store(raw: &str) -> MemoryOverrideStore {
    MemoryOverrideStore::with_entry(LOCAL_OVERRIDE_KEY, raw)
}

/// Shorthand for a surface record.
pub fn flags(publisher: bool, editor: bool, viewer: bool) -> SurfaceFlags {
    SurfaceFlags {
        publisher,
        editor,
        viewer,
    }
}
