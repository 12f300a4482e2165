//! UI surfaces gated by the rollout.
//!
//! A [`Surface`] names one independently toggled area of the console. The set
//! is closed: tokens that do not name a surface are dropped during parsing
//! rather than reported as errors.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A named UI area whose visibility is toggled per tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// The passport publishing workflow.
    Publisher,
    /// The submodel editor.
    Editor,
    /// The read-only passport viewer.
    Viewer,
}

impl Surface {
    /// Every surface, in display order.
    pub const ALL: [Surface; 3] = [Surface::Publisher, Surface::Editor, Surface::Viewer];

    /// Parses a surface token, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for anything outside the closed set.
    ///
    /// # Examples
    ///
    /// ```
    /// use dpp_rollout::Surface;
    ///
    /// assert_eq!(Surface::parse(" Editor "), Some(Surface::Editor));
    /// assert_eq!(Surface::parse("admin"), None);
    /// ```
    pub fn parse(token: &str) -> Option<Surface> {
        match token.trim().to_lowercase().as_str() {
            "publisher" => Some(Surface::Publisher),
            "editor" => Some(Surface::Editor),
            "viewer" => Some(Surface::Viewer),
            _ => None,
        }
    }

    /// Returns the lowercase token for this surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Publisher => "publisher",
            Surface::Editor => "editor",
            Surface::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-surface enablement. All three surfaces are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceFlags {
    pub publisher: bool,
    pub editor: bool,
    pub viewer: bool,
}

impl SurfaceFlags {
    pub fn all_enabled() -> Self {
        Self {
            publisher: true,
            editor: true,
            viewer: true,
        }
    }

    pub fn all_disabled() -> Self {
        Self::default()
    }

    /// Builds flags by testing membership of each surface in `surfaces`.
    pub fn from_surfaces(surfaces: &BTreeSet<Surface>) -> Self {
        Self {
            publisher: surfaces.contains(&Surface::Publisher),
            editor: surfaces.contains(&Surface::Editor),
            viewer: surfaces.contains(&Surface::Viewer),
        }
    }

    /// Returns whether `surface` is enabled.
    pub fn get(&self, surface: Surface) -> bool {
        match surface {
            Surface::Publisher => self.publisher,
            Surface::Editor => self.editor,
            Surface::Viewer => self.viewer,
        }
    }

    /// Enables or disables a single surface.
    pub fn set(&mut self, surface: Surface, enabled: bool) {
        match surface {
            Surface::Publisher => self.publisher = enabled,
            Surface::Editor => self.editor = enabled,
            Surface::Viewer => self.viewer = enabled,
        }
    }

    /// Returns the enabled surfaces in display order.
    pub fn enabled_surfaces(&self) -> Vec<Surface> {
        Surface::ALL
            .iter()
            .copied()
            .filter(|s| self.get(*s))
            .collect()
    }

    /// Returns true if no surface is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.publisher || self.editor || self.viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Surface::parse("publisher"), Some(Surface::Publisher));
        assert_eq!(Surface::parse("PUBLISHER"), Some(Surface::Publisher));
        assert_eq!(Surface::parse("  Viewer\t"), Some(Surface::Viewer));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(Surface::parse(""), None);
        assert_eq!(Surface::parse("admin"), None);
        assert_eq!(Surface::parse("pub lisher"), None);
    }

    #[test]
    fn test_display_matches_serde() {
        for surface in Surface::ALL {
            let json = serde_json::to_string(&surface).unwrap();
            assert_eq!(json, format!("\"{}\"", surface));
        }
    }

    #[test]
    fn test_flags_from_surfaces() {
        let set: BTreeSet<_> = [Surface::Publisher, Surface::Viewer].into_iter().collect();
        let flags = SurfaceFlags::from_surfaces(&set);
        assert_eq!(
            flags,
            SurfaceFlags {
                publisher: true,
                editor: false,
                viewer: true,
            }
        );
        assert_eq!(
            flags.enabled_surfaces(),
            vec![Surface::Publisher, Surface::Viewer]
        );
    }

    #[test]
    fn test_flags_set_and_get() {
        let mut flags = SurfaceFlags::all_disabled();
        assert!(flags.is_empty());

        flags.set(Surface::Editor, true);
        assert!(flags.get(Surface::Editor));
        assert!(!flags.get(Surface::Publisher));
        assert!(!flags.is_empty());
    }

    #[test]
    fn test_flags_serialize_all_keys() {
        let json = serde_json::to_value(SurfaceFlags::all_disabled()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "publisher": false, "editor": false, "viewer": false })
        );
    }
}
