//! Cell primitives - the runtime's fixed-width value unit
//!
//! Every argument crossing the boundary is one or more cells. Floats travel
//! as raw bit patterns, never numeric casts, so they round-trip exactly.

/// The runtime's machine word. All arguments, return values and addresses
/// are carried as cells; the width is fixed for the process lifetime.
pub type Cell = i32;

/// Size of one cell in bytes. The packed-buffer header is expressed in
/// multiples of this.
pub const CELL_SIZE: usize = core::mem::size_of::<Cell>();

/// Reinterpret a float as a cell (bit-level, not numeric)
#[inline]
pub fn from_f32(value: f32) -> Cell {
    value.to_bits() as Cell
}

/// Reinterpret a cell as a float (bit-level, not numeric)
#[inline]
pub fn to_f32(cell: Cell) -> f32 {
    f32::from_bits(cell as u32)
}

/// Encode a boolean as a cell
#[inline]
pub const fn from_bool(value: bool) -> Cell {
    value as Cell
}

/// Decode a cell as a boolean (any nonzero value is true)
#[inline]
pub const fn to_bool(cell: Cell) -> bool {
    cell != 0
}
