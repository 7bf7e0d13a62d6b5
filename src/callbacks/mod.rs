//! Callback registry - event name → ordered handler chain
//!
//! Any number of plugins may subscribe to the same event. Registration order
//! is dispatch order, and it also decides which handler's return value wins,
//! so the chain is kept as an ordered list per name rather than a set.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cell::Cell;
use crate::logging::debug;
use crate::plugin::PluginId;
use crate::vm::Vm;

mod dispatch;

pub use dispatch::RetSlot;


/// Host-side event handler.
///
/// Receives the runtime handle, the raw argument stack (`params[0]` is the
/// byte-length header) and the shared return slot. The returned boolean is
/// this handler's verdict on whether the scripting layer's own handler
/// should still run.
pub type CallbackHandler = fn(vm: &mut Vm, params: &[Cell], ret: &mut RetSlot) -> bool;

/// Static registration table entry
#[derive(Clone, Copy)]
pub struct CallbackDef {
    pub name: &'static str,
    pub handler: CallbackHandler,
}

#[derive(Clone, Copy)]
struct CallbackEntry {
    owner: PluginId,
    handler: CallbackHandler,
}

/// Name-addressed tables of event handlers
pub struct CallbackRegistry {
    tables: RwLock<HashMap<String, Vec<CallbackEntry>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self { tables: RwLock::new(HashMap::new()) }
    }

    /// Subscribe `owner` to the named event, appended after existing
    /// handlers
    pub fn register(&self, name: &str, handler: CallbackHandler, owner: PluginId) {
        let mut tables = self.tables.write();
        tables
            .entry(name.to_owned())
            .or_default()
            .push(CallbackEntry { owner, handler });
        debug!(event = "callback_registered", name, owner = owner.raw());
    }

    /// Register a whole static table for one plugin
    pub fn register_table(&self, owner: PluginId, defs: &[CallbackDef]) {
        for def in defs {
            self.register(def.name, def.handler, owner);
        }
    }

    /// Remove `owner`'s handlers for one event name
    pub fn unregister(&self, name: &str, owner: PluginId) {
        let mut tables = self.tables.write();
        if let Some(entries) = tables.get_mut(name) {
            entries.retain(|entry| entry.owner != owner);
            if entries.is_empty() {
                tables.remove(name);
            }
        }
    }

    /// Remove every registration owned by `owner` across all events.
    ///
    /// Runs on plugin unload only; a linear sweep over all tables is fine
    /// there.
    pub fn unregister_all(&self, owner: PluginId) {
        let mut tables = self.tables.write();
        tables.retain(|_, entries| {
            entries.retain(|entry| entry.owner != owner);
            !entries.is_empty()
        });
        debug!(event = "callbacks_unregistered", owner = owner.raw());
    }

    /// Number of handlers currently subscribed to `name`
    pub fn handler_count(&self, name: &str) -> usize {
        self.tables.read().get(name).map_or(0, Vec::len)
    }

    /// Drop every table (final teardown)
    pub fn clear(&self) {
        self.tables.write().clear();
    }

    fn snapshot(&self, name: &str) -> Option<Vec<CallbackEntry>> {
        self.tables.read().get(name).cloned()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
