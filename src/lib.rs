//! cellbridge - bidirectional bridge between host plugins and an embedded
//! cell-based scripting runtime
//!
//! The runtime exposes a flat table of named native functions taking packed
//! cell arrays; the host wants typed calls in, and a veto over the runtime's
//! own event handling coming back out. This crate is the translation layer
//! for both directions:
//!
//! - host → runtime: a format-driven marshaler ([`invoke_native`]) that
//!   packs typed arguments into the cell calling convention and copies
//!   output parameters back;
//! - runtime → host: a callback registry whose dispatcher runs every
//!   subscribed handler for an event and reduces their verdicts to one
//!   decision and one return cell (the public filter).

pub mod bridge;
pub mod callbacks;
pub mod cell;
pub mod logging;
pub mod marshal;
pub mod natives;
pub mod plugin;
pub mod version;
pub mod vm;

// Re-export the working surface
pub use bridge::{global, Bridge};
pub use callbacks::{CallbackDef, CallbackHandler, CallbackRegistry, RetSlot};
pub use cell::{Cell, CELL_SIZE};
pub use marshal::{call_native, invoke_native, Arg, MarshalError};
pub use natives::{NativeDef, NativeFn, NativeInfo, NativeRegistry};
pub use plugin::{cleanup, init, PluginId};
pub use version::{version_id, version_string};
pub use vm::{HeapError, ScratchMark, Vm};
