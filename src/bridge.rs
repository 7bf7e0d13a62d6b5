//! Bridge context - the process-wide registries behind one owner
//!
//! Both registries are owned by an explicit context with defined
//! construction and teardown, so the locking discipline is testable against
//! isolated instances. The process-wide instance plugins share lives behind
//! a lazy static, the usual arrangement for a library linked into several
//! plugins of one host.

use core::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashSet;
use once_cell::sync::Lazy;

use crate::callbacks::CallbackRegistry;
use crate::cell::Cell;
use crate::logging::info;
use crate::natives::NativeRegistry;
use crate::plugin::PluginId;
use crate::vm::Vm;

static BRIDGE: Lazy<Bridge> = Lazy::new(Bridge::new);

/// The process-wide bridge instance
pub fn global() -> &'static Bridge {
    &BRIDGE
}

/// Owner of the native and callback registries plus the set of live plugins
pub struct Bridge {
    pub natives: NativeRegistry,
    pub callbacks: CallbackRegistry,
    plugins: DashSet<PluginId>,
    next_plugin: AtomicU64,
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            natives: NativeRegistry::new(),
            callbacks: CallbackRegistry::new(),
            plugins: DashSet::new(),
            next_plugin: AtomicU64::new(1),
        }
    }

    /// Issue a handle and subscribe the plugin to event delivery
    pub fn register_plugin(&self) -> PluginId {
        let id = PluginId::new(self.next_plugin.fetch_add(1, Ordering::Relaxed));
        self.plugins.insert(id);
        info!(event = "plugin_registered", plugin = id.raw());
        id
    }

    /// Remove a plugin and all of its callback registrations.
    ///
    /// The last plugin out performs the final cleanup: both registries are
    /// emptied. Unknown handles are ignored.
    pub fn unregister_plugin(&self, plugin: PluginId) {
        if self.plugins.remove(&plugin).is_none() {
            return;
        }
        self.callbacks.unregister_all(plugin);
        if self.plugins.is_empty() {
            self.natives.clear();
            self.callbacks.clear();
        }
        info!(event = "plugin_unregistered", plugin = plugin.raw());
    }

    pub fn is_registered(&self, plugin: PluginId) -> bool {
        self.plugins.contains(&plugin)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Run the public filter for an incoming event (see
    /// [`CallbackRegistry::dispatch`])
    #[inline]
    pub fn dispatch(&self, vm: &mut Vm, name: &str, params: &[Cell]) -> (bool, Cell) {
        self.callbacks.dispatch(vm, name, params)
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}
