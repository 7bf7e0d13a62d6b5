//! Test suite for the marshaling path

use super::*;
use crate::cell::{self, Cell, CELL_SIZE};
use crate::vm::Vm;

use parking_lot::Mutex;

// Test natives

fn add_ints(_vm: &mut Vm, params: &[Cell]) -> Cell {
    params[1] + params[2]
}

fn echo_first(_vm: &mut Vm, params: &[Cell]) -> Cell {
    params[1]
}

fn read_const_ref(vm: &mut Vm, params: &[Cell]) -> Cell {
    vm.cell(params[1]).unwrap()
}

fn bump_ref(vm: &mut Vm, params: &[Cell]) -> Cell {
    let value = vm.cell(params[1]).unwrap();
    vm.set_cell(params[1], value + 1).unwrap();
    value
}

fn string_len(vm: &mut Vm, params: &[Cell]) -> Cell {
    vm.string(params[1]).unwrap().len() as Cell
}

fn greet(vm: &mut Vm, params: &[Cell]) -> Cell {
    let who = vm.string(params[1]).unwrap();
    vm.write_string(params[2], &format!("hello {}", who), 64).unwrap();
    1
}

fn write_eight_cap9(vm: &mut Vm, params: &[Cell]) -> Cell {
    vm.write_string(params[1], "abcdefgh", 9).unwrap();
    0
}

fn write_eight_cap8(vm: &mut Vm, params: &[Cell]) -> Cell {
    vm.write_string(params[1], "abcdefgh", 8).unwrap();
    0
}

fn fill_without_terminator(vm: &mut Vm, params: &[Cell]) -> Cell {
    // a misbehaving native: fills its whole buffer, no terminator
    for offset in 0..8 {
        vm.set_cell(params[1] + offset, b'x' as Cell).unwrap();
    }
    0
}

static SHAPE: Mutex<Vec<Cell>> = Mutex::new(Vec::new());

fn capture_shape(_vm: &mut Vm, params: &[Cell]) -> Cell {
    *SHAPE.lock() = params.to_vec();
    0
}

static EMPTY_CALL: Mutex<Vec<Cell>> = Mutex::new(Vec::new());

fn capture_empty(_vm: &mut Vm, params: &[Cell]) -> Cell {
    *EMPTY_CALL.lock() = params.to_vec();
    7
}

// Format parsing

#[test]
fn parse_covers_the_specifier_alphabet() {
    let specs = parse("idbfrRsS").unwrap();
    assert_eq!(
        specs,
        [
            Spec::Int,
            Spec::Int,
            Spec::Bool,
            Spec::Float,
            Spec::ConstRef,
            Spec::MutRef,
            Spec::ConstString,
            Spec::MutString,
        ]
    );
}

#[test]
fn parse_rejects_unknown_specifier() {
    assert_eq!(
        parse("ix").unwrap_err(),
        MarshalError::UnknownSpecifier { specifier: 'x' }
    );
}

// By-value arguments

#[test]
fn integers_pass_by_value() {
    let mut vm = Vm::new();
    let ret = invoke_native(&mut vm, add_ints, "ii", &mut [Arg::Int(2), Arg::Int(40)]).unwrap();
    assert_eq!(ret, 42);
}

#[test]
fn floats_pass_as_bit_patterns() {
    let mut vm = Vm::new();
    let ret = invoke_native(&mut vm, echo_first, "f", &mut [Arg::Float(3.5)]).unwrap();
    assert_eq!(cell::to_f32(ret), 3.5);

    let nan = f32::from_bits(0x7fc0_0042);
    let ret = invoke_native(&mut vm, echo_first, "f", &mut [Arg::Float(nan)]).unwrap();
    assert_eq!(cell::to_f32(ret).to_bits(), nan.to_bits());
}

#[test]
fn bools_encode_as_zero_or_one() {
    let mut vm = Vm::new();
    let ret = invoke_native(&mut vm, echo_first, "b", &mut [Arg::Bool(true)]).unwrap();
    assert_eq!(ret, 1);
    let ret = invoke_native(&mut vm, echo_first, "b", &mut [Arg::Bool(false)]).unwrap();
    assert_eq!(ret, 0);
}

// References

#[test]
fn const_refs_are_readable_by_address() {
    let mut vm = Vm::new();
    let ret = invoke_native(&mut vm, read_const_ref, "r", &mut [Arg::ConstRef(77)]).unwrap();
    assert_eq!(ret, 77);
}

#[test]
fn mut_refs_copy_back() {
    let mut vm = Vm::new();
    let mut slot: Cell = 10;
    let ret = invoke_native(&mut vm, bump_ref, "R", &mut [Arg::MutRef(&mut slot)]).unwrap();
    assert_eq!(ret, 10);
    assert_eq!(slot, 11);
}

// Strings

#[test]
fn const_strings_stage_null_terminated() {
    let mut vm = Vm::new();
    let ret = invoke_native(&mut vm, string_len, "s", &mut [Arg::Str("hello")]).unwrap();
    assert_eq!(ret, 5);
}

#[test]
fn mut_strings_copy_back() {
    let mut vm = Vm::new();
    let mut buf = String::new();
    let ret = invoke_native(
        &mut vm,
        greet,
        "sS",
        &mut [Arg::Str("world"), Arg::MutStr(&mut buf, 64)],
    )
    .unwrap();
    assert_eq!(ret, 1);
    assert_eq!(buf, "hello world");
}

#[test]
fn output_at_capacity_keeps_room_for_the_terminator() {
    let mut vm = Vm::new();
    // native writes 8 bytes; a 9-cell buffer holds all of it
    let mut buf = String::new();
    invoke_native(&mut vm, write_eight_cap9, "S", &mut [Arg::MutStr(&mut buf, 9)]).unwrap();
    assert_eq!(buf, "abcdefgh");

    // one cell less and the last byte is dropped
    let mut buf = String::new();
    invoke_native(&mut vm, write_eight_cap8, "S", &mut [Arg::MutStr(&mut buf, 8)]).unwrap();
    assert_eq!(buf, "abcdefg");
}

#[test]
fn unterminated_output_is_clamped_at_capacity() {
    let mut vm = Vm::new();
    let mut buf = String::new();
    invoke_native(
        &mut vm,
        fill_without_terminator,
        "S",
        &mut [Arg::MutStr(&mut buf, 8)],
    )
    .unwrap();
    assert_eq!(buf, "xxxxxxx");
    assert_eq!(buf.len(), 7);
}

// Packed buffer shape

#[test]
fn packed_buffer_has_header_and_one_cell_per_argument() {
    let mut vm = Vm::new();
    let mut buf = String::from("buf");
    invoke_native(
        &mut vm,
        capture_shape,
        "isS",
        &mut [Arg::Int(5), Arg::Str("hello"), Arg::MutStr(&mut buf, 64)],
    )
    .unwrap();

    let params = SHAPE.lock().clone();
    assert_eq!(params.len(), 4);
    assert_eq!(params[0], (3 * CELL_SIZE) as Cell);
    assert_eq!(params[1], 5);
    // the two string slots carry distinct staging addresses, not bytes
    assert_ne!(params[2], params[3]);
}

#[test]
fn zero_argument_call_sees_a_zeroed_header() {
    let mut vm = Vm::new();
    let ret = invoke_native(&mut vm, capture_empty, "", &mut []).unwrap();
    assert_eq!(ret, 7);
    assert_eq!(*EMPTY_CALL.lock(), [0]);
}

#[test]
fn raw_call_passes_params_through() {
    let mut vm = Vm::new();
    assert_eq!(call_native(&mut vm, add_ints, &[8, 20, 22]), 42);
}

// Contract violations

#[test]
fn arity_mismatch_is_rejected() {
    let mut vm = Vm::new();
    let err = invoke_native(&mut vm, echo_first, "ii", &mut [Arg::Int(1)]).unwrap_err();
    assert_eq!(err, MarshalError::ArityMismatch { expected: 2, got: 1 });
}

#[test]
fn specifier_mismatch_is_rejected() {
    let mut vm = Vm::new();
    let err = invoke_native(&mut vm, echo_first, "i", &mut [Arg::Bool(true)]).unwrap_err();
    assert_eq!(
        err,
        MarshalError::SpecifierMismatch { index: 0, specifier: 'i', got: "bool" }
    );
}

#[test]
fn mutable_string_without_capacity_is_rejected() {
    let mut vm = Vm::new();
    let mut buf = String::new();
    let err =
        invoke_native(&mut vm, echo_first, "S", &mut [Arg::MutStr(&mut buf, 0)]).unwrap_err();
    assert_eq!(err, MarshalError::MissingCapacity { index: 0 });
}

#[test]
fn failed_validation_leaves_no_partial_writes() {
    let mut vm = Vm::new();
    let mut slot: Cell = 123;
    let heap_before = vm.heap_size();

    let err = invoke_native(
        &mut vm,
        echo_first,
        "Rx",
        &mut [Arg::MutRef(&mut slot), Arg::Int(0)],
    )
    .unwrap_err();

    assert_eq!(err, MarshalError::UnknownSpecifier { specifier: 'x' });
    assert_eq!(slot, 123);
    assert_eq!(vm.heap_size(), heap_before);
}

#[test]
fn scratch_is_released_after_the_call() {
    let mut vm = Vm::new();
    let heap_before = vm.heap_size();
    let mut buf = String::new();
    invoke_native(
        &mut vm,
        greet,
        "sS",
        &mut [Arg::Str("scratch"), Arg::MutStr(&mut buf, 64)],
    )
    .unwrap();
    assert_eq!(vm.heap_size(), heap_before);
}
