use super::{CommandSet, Flow, Machine, VmError};

pub const HALT: u8 = b'@';
pub const STORE: u8 = b'$';
pub const LOAD: u8 = b'!';
pub const SHIFT_RIGHT: u8 = b'}';
pub const SHIFT_LEFT: u8 = b'{';
pub const NOT: u8 = b'~';
pub const XOR: u8 = b'^';
pub const AND: u8 = b'&';
pub const OR: u8 = b'|';

/// Storage register, bit twiddling and an explicit halt
pub struct ExtendedType1;

impl CommandSet for ExtendedType1 {
    fn commands(&self) -> &'static [u8] {
        &[HALT, STORE, LOAD, SHIFT_RIGHT, SHIFT_LEFT, NOT, XOR, AND, OR]
    }

    fn execute(&self, machine: &mut Machine<'_>, instruction: u8) -> Result<Flow, VmError> {
        let cell = machine.tape().get();
        let storage = machine.storage();

        let value = match instruction {
            HALT => return Ok(Flow::Halt),
            STORE => {
                machine.set_storage(cell);
                return Ok(Flow::Next);
            }
            LOAD => storage,
            SHIFT_RIGHT => cell >> 1,
            // the top bit falls off the cell
            SHIFT_LEFT => cell << 1,
            NOT => !cell,
            XOR => cell ^ storage,
            AND => cell & storage,
            OR => cell | storage,
            _ => return Ok(Flow::Unhandled),
        };

        machine.tape_mut().set(value as i64);
        Ok(Flow::Next)
    }
}
