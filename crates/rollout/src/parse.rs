//! Tolerant parsing of rollout configuration values.
//!
//! Rollout configuration arrives as loosely typed strings (environment
//! variables, build-time injected values). Every helper here is total: a
//! malformed value degrades to a documented default and never produces an
//! error, so a misconfigured rollout cannot break the caller's render path.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::warn;

use crate::surface::Surface;
use crate::tenant::TenantId;

/// Surface list used when a configured list yields no valid surface.
pub const DEFAULT_SURFACES: &str = "publisher,editor,viewer";

const TRUE_TOKENS: &[&str] = &["1", "true", "yes", "on"];
const FALSE_TOKENS: &[&str] = &["0", "false", "no", "off"];

/// Parses a boolean-like flag.
///
/// Accepts `1`, `true`, `yes`, `on` and `0`, `false`, `no`, `off` in any case.
/// Anything else, including an absent value, yields `fallback`.
///
/// # Examples
///
/// ```
/// use dpp_rollout::parse::parse_bool_flag;
///
/// assert!(parse_bool_flag(Some("YES"), false));
/// assert!(!parse_bool_flag(Some("off"), true));
/// assert!(parse_bool_flag(Some("maybe"), true));
/// assert!(!parse_bool_flag(None, false));
/// ```
pub fn parse_bool_flag(raw: Option<&str>, fallback: bool) -> bool {
    let Some(raw) = raw else {
        return fallback;
    };
    let token = raw.trim().to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        true
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        false
    } else {
        fallback
    }
}

/// Splits a comma-separated list into trimmed, non-empty tokens.
fn tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Parses a comma-separated tenant list into a set of normalized IDs.
///
/// Empty members are dropped, so an empty string yields an empty set.
pub fn parse_tenant_list(raw: Option<&str>) -> BTreeSet<TenantId> {
    raw.map(|r| tokens(r).map(TenantId::new).collect())
        .unwrap_or_default()
}

/// Parses a comma-separated surface list.
///
/// Unknown tokens are dropped. If no valid surface remains, the full
/// [`DEFAULT_SURFACES`] list is returned instead.
pub fn parse_surface_list(raw: Option<&str>) -> BTreeSet<Surface> {
    let surfaces = collect_surfaces(raw.unwrap_or_default());
    if surfaces.is_empty() {
        collect_surfaces(DEFAULT_SURFACES)
    } else {
        surfaces
    }
}

fn collect_surfaces(raw: &str) -> BTreeSet<Surface> {
    tokens(raw).filter_map(Surface::parse).collect()
}

/// Parses the per-tenant surface override map.
///
/// The input is a JSON object mapping tenant IDs to either an array of
/// surface tokens or a comma-joined token string. Each value goes through
/// [`parse_surface_list`]. Entries whose value is any other JSON type are
/// skipped, as are entries with an empty tenant key. Invalid JSON, or JSON
/// that is not an object, yields an empty map.
pub fn parse_tenant_surface_overrides(raw: Option<&str>) -> BTreeMap<TenantId, BTreeSet<Surface>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return BTreeMap::new();
    };

    let object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            warn!(
                kind = json_kind(&other),
                "Tenant surface overrides are not a JSON object; ignoring"
            );
            return BTreeMap::new();
        }
        Err(e) => {
            warn!(error = %e, "Tenant surface overrides are not valid JSON; ignoring");
            return BTreeMap::new();
        }
    };

    let mut overrides = BTreeMap::new();
    for (key, value) in object {
        let tenant = TenantId::new(&key);
        if tenant.is_empty() {
            continue;
        }

        let joined = match value {
            Value::String(s) => s,
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(","),
            other => {
                warn!(
                    tenant = %tenant,
                    kind = json_kind(&other),
                    "Skipping tenant surface override with unsupported value"
                );
                continue;
            }
        };

        overrides.insert(tenant, parse_surface_list(Some(joined.as_str())));
    }

    overrides
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenants(list: &[&str]) -> BTreeSet<TenantId> {
        list.iter().map(TenantId::new).collect()
    }

    fn surfaces(list: &[Surface]) -> BTreeSet<Surface> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_bool_flag_true_tokens() {
        for token in ["1", "true", "TRUE", "Yes", "on", " On "] {
            assert!(parse_bool_flag(Some(token), false), "token {token:?}");
        }
    }

    #[test]
    fn test_bool_flag_false_tokens() {
        for token in ["0", "false", "False", "NO", "off", "\toff"] {
            assert!(!parse_bool_flag(Some(token), true), "token {token:?}");
        }
    }

    #[test]
    fn test_bool_flag_fallback() {
        assert!(parse_bool_flag(None, true));
        assert!(!parse_bool_flag(None, false));
        assert!(parse_bool_flag(Some(""), true));
        assert!(!parse_bool_flag(Some("enabled"), false));
        assert!(parse_bool_flag(Some("2"), true));
    }

    #[test]
    fn test_tenant_list_normalizes_members() {
        let parsed = parse_tenant_list(Some(" Canary-A, canary-b ,CANARY-A"));
        assert_eq!(parsed, tenants(&["canary-a", "canary-b"]));
    }

    #[test]
    fn test_tenant_list_empty_string_is_empty_set() {
        assert!(parse_tenant_list(Some("")).is_empty());
        assert!(parse_tenant_list(Some(" , ,, ")).is_empty());
        assert!(parse_tenant_list(None).is_empty());
    }

    #[test]
    fn test_surface_list_drops_unknown_tokens() {
        let parsed = parse_surface_list(Some("Publisher, admin ,viewer"));
        assert_eq!(parsed, surfaces(&[Surface::Publisher, Surface::Viewer]));
    }

    #[test]
    fn test_surface_list_falls_back_to_default() {
        let all = surfaces(&Surface::ALL);
        assert_eq!(parse_surface_list(None), all);
        assert_eq!(parse_surface_list(Some("")), all);
        assert_eq!(parse_surface_list(Some("admin,owner")), all);
    }

    #[test]
    fn test_overrides_array_and_string_values() {
        let parsed = parse_tenant_surface_overrides(Some(
            r#"{"Alpha": ["publisher", "viewer"], "beta": "editor, viewer"}"#,
        ));

        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed[&TenantId::new("alpha")],
            surfaces(&[Surface::Publisher, Surface::Viewer])
        );
        assert_eq!(
            parsed[&TenantId::new("beta")],
            surfaces(&[Surface::Editor, Surface::Viewer])
        );
    }

    #[test]
    fn test_overrides_ignore_non_string_array_items() {
        let parsed = parse_tenant_surface_overrides(Some(r#"{"alpha": ["editor", 3, null]}"#));
        assert_eq!(parsed[&TenantId::new("alpha")], surfaces(&[Surface::Editor]));
    }

    #[test]
    fn test_overrides_skip_unsupported_values_and_empty_keys() {
        let parsed = parse_tenant_surface_overrides(Some(
            r#"{"alpha": true, "beta": {"publisher": true}, "  ": ["viewer"], "gamma": "viewer"}"#,
        ));
        assert_eq!(parsed.len(), 1);
        assert!(parsed.contains_key(&TenantId::new("gamma")));
    }

    #[test]
    fn test_overrides_empty_list_falls_back_to_default() {
        let parsed = parse_tenant_surface_overrides(Some(r#"{"alpha": []}"#));
        assert_eq!(parsed[&TenantId::new("alpha")], surfaces(&Surface::ALL));
    }

    #[test]
    fn test_overrides_malformed_json_is_empty() {
        assert!(parse_tenant_surface_overrides(Some(r#"{"alpha": ["publ"#)).is_empty());
        assert!(parse_tenant_surface_overrides(Some("not json")).is_empty());
        assert!(parse_tenant_surface_overrides(Some(r#"["alpha"]"#)).is_empty());
        assert!(parse_tenant_surface_overrides(Some("")).is_empty());
        assert!(parse_tenant_surface_overrides(None).is_empty());
    }
}
