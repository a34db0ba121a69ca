pub mod tape;

pub use self::tape::Tape;

/// Number of distinct values a cell can hold
pub const CELL_VALUES: i64 = 256;

/// Reduce any integer into a cell value, wrapping in both directions
/// i.e. `256 -> 0`, `-1 -> 255`, `-513 -> 255`
pub fn normalize(value: i64) -> u8 {
    value.rem_euclid(CELL_VALUES) as u8
}
