//! Declarative configuration - attribute names, numeric coercion, page config.
//!
//! Every behavior reads its options from marker attributes once, at
//! activation. Lookups never fail outward: a missing or malformed value
//! becomes the documented default.

use log::debug;

use crate::error::{Error, Result};

// =============================================================================
// ATTRIBUTE NAMES
// =============================================================================

/// Page-wide "scroll is locked" marker, set on the root element.
pub const ATTR_SCROLL_LOCK: &str = "data-fls-scrolllock";
/// Lock-padding target marker.
pub const ATTR_LOCK_PADDING: &str = "data-fls-lp";

/// Menu toggle marker.
pub const ATTR_MENU: &str = "data-fls-menu";
/// Page-wide "menu is open" marker, set on the root element.
pub const ATTR_MENU_OPEN: &str = "data-fls-menu-open";

/// Header marker. Its value is read as a threshold when no explicit one is given.
pub const ATTR_HEADER_SCROLL: &str = "data-fls-header-scroll";
pub const ATTR_HEADER_THRESHOLD: &str = "data-fls-header-scroll-threshold";
/// Enables show-on-scroll-up. Its value is read as a delay when no explicit one is given.
pub const ATTR_HEADER_SHOW: &str = "data-fls-header-scroll-show";
pub const ATTR_HEADER_SHOW_DELAY: &str = "data-fls-header-scroll-show-delay";

/// Rating marker. `"set"` makes the widget interactive.
pub const ATTR_RATING: &str = "data-fls-rating";
pub const ATTR_RATING_VALUE: &str = "data-fls-rating-value";
pub const ATTR_RATING_SIZE: &str = "data-fls-rating-size";
pub const ATTR_RATING_TITLE: &str = "data-fls-rating-title";
pub const ATTR_RATING_TITLE_LEGACY: &str = "data-rating-title";
pub const RATING_SETTABLE: &str = "set";

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default lock/unlock transition delay.
pub const DEFAULT_LOCK_DELAY_MS: u64 = 500;
/// Default header show debounce.
pub const DEFAULT_SHOW_DELAY_MS: u64 = 500;
/// Default scrolled-state threshold.
pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 1.0;
/// Default number of rating items.
pub const DEFAULT_RATING_SIZE: usize = 5;
/// Largest accepted number of rating items. Bigger sizes fall back to the default.
pub const MAX_RATING_SIZE: usize = 100;

// =============================================================================
// PAGE CONFIG
// =============================================================================

/// Host-level configuration for a [`Page`](crate::pipeline::Page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    /// Delay used by the menu toggle when it locks/unlocks scrolling.
    pub lock_delay_ms: u64,
    /// The environment preloads modules itself, so the preloader stays idle.
    pub native_modulepreload: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            lock_delay_ms: DEFAULT_LOCK_DELAY_MS,
            native_modulepreload: false,
        }
    }
}

// =============================================================================
// NUMERIC COERCION
// =============================================================================

/// Parse a numeric attribute value.
///
/// Absent or blank is `Ok(None)`. Anything that does not parse to a finite
/// number is an [`Error::InvalidNumber`].
pub fn parse_number(attribute: &str, raw: Option<&str>) -> Result<Option<f64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(Error::InvalidNumber {
            attribute: attribute.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Parse a strictly positive numeric attribute value.
pub fn parse_positive(attribute: &str, raw: Option<&str>) -> Result<Option<f64>> {
    match parse_number(attribute, raw)? {
        Some(value) if value <= 0.0 => Err(Error::NonPositive {
            attribute: attribute.to_string(),
            value,
        }),
        other => Ok(other),
    }
}

/// Numeric attribute, falling back to `default` when absent or malformed.
pub fn number_or(attribute: &str, raw: Option<&str>, default: f64) -> f64 {
    match parse_number(attribute, raw) {
        Ok(value) => value.unwrap_or(default),
        Err(err) => {
            debug!("{err}; using default {default}");
            default
        }
    }
}

/// Positive attribute, falling back to `default` when absent, malformed or not positive.
pub fn positive_or(attribute: &str, raw: Option<&str>, default: f64) -> f64 {
    match parse_positive(attribute, raw) {
        Ok(value) => value.unwrap_or(default),
        Err(err) => {
            debug!("{err}; using default {default}");
            default
        }
    }
}

/// First candidate attribute that yields a usable number.
///
/// Candidates are tried in order; malformed ones are skipped like absent ones.
pub fn first_number<'a, I>(candidates: I) -> Option<f64>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    candidates.into_iter().find_map(|(attribute, raw)| {
        match parse_number(attribute, raw) {
            Ok(value) => value,
            Err(err) => {
                debug!("{err}; skipped");
                None
            }
        }
    })
}
