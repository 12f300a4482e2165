//! Local rollout overrides.
//!
//! Developers and automated tests can pin a tenant's surfaces regardless of
//! the deployed configuration by writing a record under
//! [`LOCAL_OVERRIDE_KEY`]. The stored value is a JSON object keyed by tenant:
//!
//! ```json
//! { "default": { "publisher": true, "editor": false } }
//! ```
//!
//! A surface is enabled unless its field is explicitly `false`; an absent
//! field means enabled. Entries that are not JSON objects are ignored, and a
//! value that is not valid JSON reads as no overrides at all.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::parse::json_kind;
use crate::store::{LOCAL_OVERRIDE_KEY, OverrideStore, OverrideStoreMut};
use crate::surface::{Surface, SurfaceFlags};
use crate::tenant::TenantId;

/// Parsed local override records, keyed by normalized tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalOverrides {
    records: BTreeMap<TenantId, SurfaceFlags>,
}

impl LocalOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the override records from `store`.
    pub fn load(store: &dyn OverrideStore) -> Self {
        match store.get(LOCAL_OVERRIDE_KEY) {
            Some(raw) => Self::parse(&raw),
            None => Self::default(),
        }
    }

    /// Parses the stored JSON value. Never fails.
    ///
    /// Keys that normalize to an empty tenant are dropped. When two keys
    /// normalize to the same tenant (`"Alpha"` and `"alpha"`), the one that
    /// sorts last as a raw string wins.
    pub fn parse(raw: &str) -> Self {
        let object = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                warn!(kind = json_kind(&other), "Local rollout overrides are not a JSON object");
                return Self::default();
            }
            Err(e) => {
                warn!(error = %e, "Local rollout overrides are not valid JSON");
                return Self::default();
            }
        };

        let mut records = BTreeMap::new();
        for (key, value) in object {
            let tenant = TenantId::new(&key);
            if tenant.is_empty() {
                debug!("Ignoring local override with an empty tenant key");
                continue;
            }
            let Value::Object(fields) = value else {
                debug!(tenant = %key, "Ignoring local override that is not an object");
                continue;
            };
            if records.insert(tenant, flags_from_record(&fields)).is_some() {
                debug!(key = %key, "Local override key collides after normalization; later key wins");
            }
        }

        Self { records }
    }

    /// Returns the override record for `tenant`, if one exists.
    pub fn get(&self, tenant: &TenantId) -> Option<SurfaceFlags> {
        self.records.get(tenant).copied()
    }

    /// Adds or replaces the record for `tenant`.
    pub fn insert(&mut self, tenant: impl Into<TenantId>, flags: SurfaceFlags) {
        self.records.insert(tenant.into(), flags);
    }

    /// Removes the record for `tenant`, returning it if present.
    pub fn remove(&mut self, tenant: &TenantId) -> Option<SurfaceFlags> {
        self.records.remove(tenant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TenantId, &SurfaceFlags)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serializes the records in the stored format.
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .records
            .iter()
            .map(|(tenant, flags)| {
                let fields: Map<String, Value> = Surface::ALL
                    .iter()
                    .map(|s| (s.as_str().to_string(), Value::Bool(flags.get(*s))))
                    .collect();
                (tenant.as_str().to_string(), Value::Object(fields))
            })
            .collect();
        Value::Object(object)
    }

    /// Writes the records back to `store`. An empty set removes the key.
    pub fn save(&self, store: &dyn OverrideStoreMut) -> StoreResult<()> {
        if self.records.is_empty() {
            return store.remove(LOCAL_OVERRIDE_KEY);
        }
        let raw = serde_json::to_string(&self.to_json())?;
        store.set(LOCAL_OVERRIDE_KEY, &raw)
    }
}

fn flags_from_record(fields: &Map<String, Value>) -> SurfaceFlags {
    let mut flags = SurfaceFlags::all_enabled();
    for surface in Surface::ALL {
        if matches!(fields.get(surface.as_str()), Some(Value::Bool(false))) {
            flags.set(surface, false);
        }
    }
    flags
}
