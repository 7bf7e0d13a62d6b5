//! Plugin lifecycle bookkeeping
//!
//! Plugins announce themselves once at load and are unhooked at unload;
//! everything in between (event delivery, native invocation) keys off the
//! handle issued here.

pub mod symbols;

use crate::bridge;
use crate::logging;

/// Opaque handle identifying one registered plugin.
///
/// Handles are never reused within a bridge instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(u64);

impl PluginId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Numeric form, for diagnostics
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Initialize the bridge for the calling plugin.
///
/// Sets up logging on first use and registers the plugin for event
/// delivery. Call once per plugin at load; the returned handle owns all of
/// the plugin's callback registrations.
pub fn init() -> PluginId {
    logging::init();
    bridge::global().register_plugin()
}

/// Unregister a plugin and tear down everything it owns.
///
/// The reverse of [`init`]; the last plugin out also clears the native
/// table. Unknown handles are ignored.
pub fn cleanup(plugin: PluginId) {
    bridge::global().unregister_plugin(plugin);
}
