//! # Paper Profiles
//!
//! Named baseline adjustments for the media the VC-500W can load.
//!
//! ZINK ("zero ink") media develops color thermally and responds differently
//! from standard cassettes: it runs cyan-heavy and crushes shadow detail, so
//! its profile counters both. Profiles are data, not behavior — resolving
//! one is a pure lookup, and combining it with user sliders is the caller's
//! job (profile as baseline, sliders stacked on top, final clamping done by
//! the engine).
//!
//! ## Usage
//!
//! ```
//! use hermano::color::profile;
//!
//! let baseline = profile::resolve("zink")?;
//! assert!(baseline.cyan < 0);
//! # Ok::<(), hermano::HermanoError>(())
//! ```

use super::adjust::AdjustmentSet;
use crate::error::HermanoError;

/// A named adjustment baseline for one media type.
#[derive(Debug, Clone, Copy)]
pub struct PaperProfile {
    /// Registry name, matched case-insensitively by [`resolve`].
    pub name: &'static str,
    /// Baseline adjustments applied before user sliders.
    pub adjustments: AdjustmentSet,
}

impl PaperProfile {
    /// Standard cassette media: the identity baseline.
    pub const STANDARD: Self = Self {
        name: "standard",
        adjustments: AdjustmentSet {
            cyan: 0,
            magenta: 0,
            yellow: 0,
            key: 0,
            exposure: 0,
            black_level: 0,
            contrast: 0,
        },
    };

    /// ZINK media: pull cyan density back, warm up slightly, lift shadows.
    pub const ZINK: Self = Self {
        name: "zink",
        adjustments: AdjustmentSet {
            cyan: -12,
            magenta: 4,
            yellow: 6,
            key: -8,
            exposure: 10,
            black_level: 6,
            contrast: 8,
        },
    };
}

/// All registered profiles.
pub const PROFILES: &[PaperProfile] = &[PaperProfile::STANDARD, PaperProfile::ZINK];

/// Look up a profile's baseline adjustments by name (case-insensitive).
///
/// Fails with [`HermanoError::UnknownProfile`] for anything not registered.
/// Never mutates global state — two concurrent resolves are independent.
pub fn resolve(name: &str) -> Result<AdjustmentSet, HermanoError> {
    PROFILES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.adjustments)
        .ok_or_else(|| HermanoError::UnknownProfile(name.to_string()))
}

/// Names of all registered profiles, for UI listings.
pub fn list() -> Vec<&'static str> {
    PROFILES.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_standard_is_identity() {
        let adj = resolve("standard").unwrap();
        assert!(adj.is_identity());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(resolve("ZINK").unwrap(), PaperProfile::ZINK.adjustments);
        assert_eq!(resolve("Standard").unwrap(), AdjustmentSet::default());
    }

    #[test]
    fn test_unknown_profile_rejected() {
        let err = resolve("glossy").unwrap_err();
        assert!(matches!(err, HermanoError::UnknownProfile(name) if name == "glossy"));
    }

    #[test]
    fn test_list_names() {
        assert_eq!(list(), vec!["standard", "zink"]);
    }

    #[test]
    fn test_zink_sliders_in_range() {
        let z = PaperProfile::ZINK.adjustments;
        assert_eq!(z, z.clamped());
    }
}
