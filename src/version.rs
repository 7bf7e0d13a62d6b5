//! Version accessors

use once_cell::sync::Lazy;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static VERSION_ID: Lazy<u32> = Lazy::new(|| {
    let mut parts = VERSION.split('.').map(|part| part.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);
    major * 10_000 + minor * 100 + patch
});

/// Version as a comparable number: major * 10000 + minor * 100 + patch
pub fn version_id() -> u32 {
    *VERSION_ID
}

/// Version as a display string
pub fn version_string() -> &'static str {
    VERSION
}
