//! Tenant identifier type.
//!
//! This module defines the [`TenantId`] type used as the partition key for
//! rollout decisions. Tenant identifiers are case-insensitive: every
//! constructor trims surrounding whitespace and lowercases the input, so an
//! identifier read from a URL slug compares equal to the same tenant listed in
//! configuration regardless of how either was typed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A normalized tenant identifier.
///
/// # Examples
///
/// ```
/// use dpp_rollout::TenantId;
///
/// let tenant = TenantId::new("  Canary-A ");
/// assert_eq!(tenant.as_str(), "canary-a");
/// assert_eq!(tenant, TenantId::new("canary-a"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant ID, trimming and lowercasing `id`.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(normalize(id.as_ref()))
    }

    /// Creates a tenant ID from an optional raw slug.
    ///
    /// An absent slug is treated as the empty string.
    pub fn from_raw(raw: Option<&str>) -> Self {
        Self::new(raw.unwrap_or_default())
    }

    /// Returns the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the normalized identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl FromStr for TenantId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TenantId::new(s))
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        TenantId::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        TenantId::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Deserialization goes through `new` so stored keys are normalized too.
impl<'de> Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(TenantId::new(raw))
    }
}
