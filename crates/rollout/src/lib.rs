//! # dpp-rollout - Tenant Surface Rollout
//!
//! Decides, per tenant, whether the Digital Product Passport console exposes
//! its gradually rolled out UI surfaces (`publisher`, `editor`, `viewer`).
//!
//! ## Features
//!
//! - **Global switch**: master on/off plus a default surface list
//! - **Canary gating**: restrict the rollout to an allow-list of tenants
//! - **Force lists**: force-enable tenants past the canary gate, or
//!   force-disable them outright
//! - **Per-tenant surfaces**: replace the default surface list for a tenant
//! - **Local overrides**: pin a tenant's surfaces from a key/value store for
//!   local development and automated tests
//!
//! ## Resolution Priority
//!
//! | Priority | Rule | Source |
//! |----------|------|--------|
//! | 1 | Local override present for the tenant | `override` |
//! | 2 | Tenant ineligible or force-disabled | `global` (all surfaces off) |
//! | 3 | Tenant on the canary list | `canary` |
//! | 4 | Otherwise | `global` |
//!
//! ## Failure Semantics
//!
//! Resolution never fails. Malformed booleans, unknown surface tokens and
//! invalid JSON all fall back to documented defaults, and the most
//! restrictive outcome is "all surfaces disabled". Callers on a render path
//! can therefore resolve on every render without error handling.
//!
//! ## Quick Start
//!
//! ```rust
//! use dpp_rollout::{MemoryOverrideStore, RolloutConfig, RolloutResolver, Surface};
//!
//! let config = RolloutConfig::default()
//!     .with_canary(["alpha"])
//!     .with_tenant_surfaces("alpha", [Surface::Publisher, Surface::Viewer]);
//! let resolver = RolloutResolver::with_store(config, MemoryOverrideStore::new());
//!
//! let decision = resolver.resolve(Some("Alpha"));
//! assert!(decision.is_enabled(Surface::Publisher));
//! assert!(!decision.is_enabled(Surface::Editor));
//! ```
//!
//! ## Configuration
//!
//! See [`config`] for the environment variables read by
//! [`RolloutConfig::from_env`].

pub mod config;
pub mod error;
pub mod overrides;
pub mod parse;
pub mod resolver;
pub mod source;
pub mod store;
pub mod surface;
pub mod tenant;

pub use config::{RolloutConfig, RolloutSettings};
pub use error::{StoreError, StoreResult};
pub use overrides::LocalOverrides;
pub use resolver::{RolloutDecision, RolloutResolver, resolve_rollout};
pub use source::DecisionSource;
pub use store::{
    FileOverrideStore, LOCAL_OVERRIDE_KEY, MemoryOverrideStore, NoOverrideStore, OverrideStore,
    OverrideStoreMut,
};
pub use surface::{Surface, SurfaceFlags};
pub use tenant::TenantId;

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence when set; otherwise `level` applies to this
/// crate and the CLI. Output goes to stderr so command output on stdout stays
/// parseable.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("dpp_rollout={},dpp_rollout_cli={}", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
