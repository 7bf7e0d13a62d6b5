//! Native registry - the process-wide table of name → entry point
//!
//! Registration is additive and last-write-wins: re-registering a name swaps
//! the entry point in place, which is what a hot reload of the native set
//! needs. Lookups and enumeration take a read lock; mutation takes the write
//! lock, so loads happening off the dispatch thread are excluded properly.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cell::Cell;
use crate::logging::debug;
use crate::marshal::{self, Arg, MarshalError};
use crate::vm::Vm;

/// Entry point of a native function.
///
/// `params[0]` carries the argument count multiplied by the cell size;
/// `params[1..]` one cell per logical argument. Reference and string cells
/// are heap addresses resolved through the runtime handle.
pub type NativeFn = fn(vm: &mut Vm, params: &[Cell]) -> Cell;

/// Static registration table entry
#[derive(Clone, Copy)]
pub struct NativeDef {
    pub name: &'static str,
    pub func: NativeFn,
}

/// Registered native, as returned by enumeration
#[derive(Clone)]
pub struct NativeInfo {
    pub name: String,
    pub func: NativeFn,
}

#[derive(Default)]
struct NativeTable {
    /// Registration order; re-registration keeps the original slot
    entries: Vec<NativeInfo>,
    /// name → position in `entries`
    index: HashMap<String, usize>,
}

/// Name-addressed table of native entry points
pub struct NativeRegistry {
    table: RwLock<NativeTable>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self { table: RwLock::new(NativeTable::default()) }
    }

    /// Register one native. A duplicate name keeps its original position
    /// and takes the new entry point (last write wins).
    pub fn register(&self, name: &str, func: NativeFn) {
        let mut guard = self.table.write();
        let table = &mut *guard;
        match table.index.get(name) {
            Some(&slot) => {
                table.entries[slot].func = func;
                debug!(event = "native_replaced", name);
            }
            None => {
                let slot = table.entries.len();
                table.entries.push(NativeInfo { name: name.to_owned(), func });
                table.index.insert(name.to_owned(), slot);
            }
        }
    }

    /// Register a whole table; same semantics as repeated `register` calls
    pub fn register_table(&self, defs: &[NativeDef]) {
        for def in defs {
            self.register(def.name, def.func);
        }
        debug!(event = "natives_registered", count = defs.len());
    }

    /// Exact, case-sensitive lookup. Absence is a normal condition while
    /// the scripting side is still loading, not an error.
    pub fn find(&self, name: &str) -> Option<NativeFn> {
        let table = self.table.read();
        table.index.get(name).map(|&slot| table.entries[slot].func)
    }

    /// Registration-order snapshot, detached from the live table
    pub fn all(&self) -> Vec<NativeInfo> {
        self.table.read().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.table.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().entries.is_empty()
    }

    /// Drop every registration (final teardown)
    pub fn clear(&self) {
        let mut table = self.table.write();
        table.entries.clear();
        table.index.clear();
    }

    /// Look up a native by name and invoke it through the marshaler.
    ///
    /// An unknown name is a caller contract violation surfaced as
    /// [`MarshalError::NativeNotFound`].
    pub fn invoke(
        &self,
        vm: &mut Vm,
        name: &str,
        format: &str,
        args: &mut [Arg<'_>],
    ) -> Result<Cell, MarshalError> {
        let Some(native) = self.find(name) else {
            debug!(event = "native_missing", name);
            return Err(MarshalError::NativeNotFound { name: name.to_owned() });
        };
        marshal::invoke_native(vm, native, format, args)
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
