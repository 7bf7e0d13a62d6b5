//! Callback dispatch - the public filter reduction
//!
//! Every runtime-originated event funnels through `dispatch` before the
//! scripting layer runs its own handler. All subscribed handlers run, in
//! registration order, and their verdicts are reduced to a single decision:
//! the event proceeds only if every handler agreed, and the first handler to
//! claim the return slot owns the response.

use super::CallbackRegistry;
use crate::cell::Cell;
use crate::logging::trace;
use crate::vm::Vm;

/// Shared return-cell accumulator.
///
/// The first handler to call [`set`](Self::set) claims the slot; writes from
/// later handlers are ignored. This is deliberate first-writer-wins, not an
/// accident of iteration order.
#[derive(Debug, Clone, Copy)]
pub struct RetSlot {
    value: Cell,
    claimed: bool,
}

impl RetSlot {
    pub fn new() -> Self {
        Self { value: 0, claimed: false }
    }

    /// Claim the slot with `value`. Returns whether the write took effect.
    pub fn set(&mut self, value: Cell) -> bool {
        if self.claimed {
            return false;
        }
        self.value = value;
        self.claimed = true;
        true
    }

    /// The accumulated return cell (default if never claimed)
    #[inline]
    pub fn value(&self) -> Cell {
        self.value
    }

    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }
}

impl Default for RetSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    /// Run the public filter for one incoming event.
    ///
    /// Returns the aggregated proceed verdict and the winning return cell.
    /// An event nobody subscribed to passes through as `(true, 0)` without
    /// further work. Handlers run on a snapshot of the chain, so a handler
    /// may (un)register callbacks without deadlocking its own dispatch; the
    /// change takes effect from the next event on.
    pub fn dispatch(&self, vm: &mut Vm, name: &str, params: &[Cell]) -> (bool, Cell) {
        let Some(entries) = self.snapshot(name) else {
            return (true, RetSlot::new().value());
        };

        trace!(event = "dispatch", name, handlers = entries.len());

        let mut ret = RetSlot::new();
        let mut proceed = true;
        for entry in entries {
            // no short-circuit: every handler observes the event
            proceed &= (entry.handler)(vm, params, &mut ret);
        }
        (proceed, ret.value())
    }
}
