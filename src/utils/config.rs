//! Configuration and constants for the CLI.

use std::time::Duration;

/// Default timeout for tracking-service API requests
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(20);

/// Default owner of the projects being plotted
pub const DEFAULT_ENTITY: &str = "prorok-lab";

/// Default number of history rows fetched per run
pub const DEFAULT_SAMPLES: usize = 500;

/// Default x-axis key for history fetches
pub const DEFAULT_X_KEY: &str = "_step";

/// Marker character prefixing service-internal keys; stripped on merge
pub const INTERNAL_MARKER: char = '_';

/// Colour cycle for groups without a colour override.
///
/// Groups take colours in draw order, wrapping after ten.
pub const COLOUR_CYCLE: [&str; 10] = [
    "#377eb8", "#ff7f00", "#4daf4a", "#f781bf", "#a65628",
    "#984ea3", "#2bcccc", "#999999", "#e41a1c", "#dede00",
];

/// Opacity of the [low, high] band fill
pub const BAND_ALPHA: f64 = 0.3;

/// Strip the internal-marker prefix from a key, if present.
///
/// `_step` becomes `step`; keys without the marker pass through.
pub fn strip_marker(key: &str) -> &str {
    key.strip_prefix(INTERNAL_MARKER).unwrap_or(key)
}
