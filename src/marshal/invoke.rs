//! Native invocation marshaler
//!
//! Builds the packed argument buffer the runtime's calling convention
//! expects, invokes the native, and copies output arguments back into the
//! caller's storage. Scratch staging is released on every path.

use super::args::Arg;
use super::format::{self, Spec};
use super::MarshalError;
use crate::cell::{self, Cell, CELL_SIZE};
use crate::logging::{error, trace};
use crate::natives::NativeFn;
use crate::vm::Vm;

/// Output argument recorded during staging, replayed after the call in
/// original left-to-right order.
enum Writeback {
    Ref { arg: usize, addr: Cell },
    Str { arg: usize, addr: Cell, capacity: usize },
}

/// Invoke a native through the format-driven marshaler.
///
/// Each format specifier consumes the matching entry of `args`; string and
/// reference arguments are staged in the runtime heap and passed by address.
/// The raw return cell is handed back uninterpreted.
///
/// Contract violations (unknown specifier, arity or type mismatch, zero
/// mutable-string capacity) are rejected before anything is staged, so a
/// failed call leaves no partial writes behind.
pub fn invoke_native(
    vm: &mut Vm,
    native: NativeFn,
    format: &str,
    args: &mut [Arg<'_>],
) -> Result<Cell, MarshalError> {
    let specs = match validate(format, args) {
        Ok(specs) => specs,
        Err(err) => {
            error!(event = "marshal_violation", format, error = %err, "invocation rejected");
            return Err(err);
        }
    };

    trace!(event = "invoke", format, args = args.len());

    let mark = vm.mark();
    let result = stage_and_call(vm, native, &specs, args);
    vm.release(mark);
    result
}

/// Call a native with a caller-built packed buffer.
///
/// `params[0]` must hold the argument count multiplied by the cell size;
/// the return cell is passed through unchanged.
#[inline]
pub fn call_native(vm: &mut Vm, native: NativeFn, params: &[Cell]) -> Cell {
    native(vm, params)
}

fn validate(format: &str, args: &[Arg<'_>]) -> Result<Vec<Spec>, MarshalError> {
    let specs = format::parse(format)?;
    if specs.len() != args.len() {
        return Err(MarshalError::ArityMismatch { expected: specs.len(), got: args.len() });
    }
    for (index, (spec, arg)) in specs.iter().zip(args.iter()).enumerate() {
        if !arg.matches(*spec) {
            return Err(MarshalError::SpecifierMismatch {
                index,
                specifier: spec.symbol(),
                got: arg.kind(),
            });
        }
        if let Arg::MutStr(_, 0) = arg {
            return Err(MarshalError::MissingCapacity { index });
        }
    }
    Ok(specs)
}

fn stage_and_call(
    vm: &mut Vm,
    native: NativeFn,
    specs: &[Spec],
    args: &mut [Arg<'_>],
) -> Result<Cell, MarshalError> {
    debug_assert_eq!(specs.len(), args.len());

    let mut params = Vec::with_capacity(args.len() + 1);
    params.push((args.len() * CELL_SIZE) as Cell);

    let mut writebacks = Vec::new();
    for (index, arg) in args.iter().enumerate() {
        let param = match arg {
            Arg::Int(value) => *value,
            Arg::Bool(value) => cell::from_bool(*value),
            Arg::Float(value) => cell::from_f32(*value),
            Arg::ConstRef(value) => vm.alloc_cell(*value),
            Arg::MutRef(slot) => {
                let addr = vm.alloc_cell(**slot);
                writebacks.push(Writeback::Ref { arg: index, addr });
                addr
            }
            Arg::Str(s) => vm.alloc_string(s),
            Arg::MutStr(buf, capacity) => {
                let addr = vm.alloc_string_buffer(buf, *capacity);
                writebacks.push(Writeback::Str { arg: index, addr, capacity: *capacity });
                addr
            }
        };
        params.push(param);
    }

    let ret = native(vm, &params);

    for writeback in writebacks {
        match writeback {
            Writeback::Ref { arg, addr } => {
                let value = vm.cell(addr)?;
                if let Arg::MutRef(slot) = &mut args[arg] {
                    **slot = value;
                }
            }
            Writeback::Str { arg, addr, capacity } => {
                let value = vm.string_clamped(addr, capacity)?;
                if let Arg::MutStr(buf, _) = &mut args[arg] {
                    buf.clear();
                    buf.push_str(&value);
                }
            }
        }
    }

    Ok(ret)
}
