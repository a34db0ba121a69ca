use super::{
    basic::LOOP_START, extended_type1::HALT, CommandSet, Flow, Machine, VmError,
};

pub const JUMP: u8 = b'?';
pub const INSERT: u8 = b')';
pub const DELETE: u8 = b'(';
pub const MULTIPLY: u8 = b'*';
pub const DIVIDE: u8 = b'/';
pub const ADD: u8 = b'=';
pub const SUBTRACT: u8 = b'_';
pub const MODULO: u8 = b'%';

/// Self modifying programs and arithmetic against the storage register.
///
/// The program is stored on the tape (see [`Machine::new`]), so every command
/// that reads the instruction stream sees whatever the program has written there.
pub struct ExtendedType2;

impl CommandSet for ExtendedType2 {
    fn commands(&self) -> &'static [u8] {
        &[JUMP, INSERT, DELETE, MULTIPLY, DIVIDE, ADD, SUBTRACT, MODULO]
    }

    fn execute(&self, machine: &mut Machine<'_>, instruction: u8) -> Result<Flow, VmError> {
        let cell = machine.tape().get() as i64;
        let storage = machine.storage() as i64;
        let position = machine.instruction_pointer();

        let value = match instruction {
            JUMP => {
                let target = machine.tape().pointer();
                machine.set_instruction_pointer(target);
                return Ok(Flow::Jump);
            }
            INSERT => {
                machine.insert_cell();
                return Ok(Flow::Next);
            }
            DELETE => return Ok(machine.remove_cell()),
            MULTIPLY => cell * storage,
            DIVIDE | MODULO if storage == 0 => return Err(VmError::DivisionByZero { position }),
            DIVIDE => cell / storage,
            MODULO => cell % storage,
            ADD => cell + storage,
            SUBTRACT => cell - storage,
            LOOP_START => {
                if cell != 0 {
                    return Ok(Flow::Next);
                }
                // a `@` before the partner bracket ends the program
                let end = machine.scan_forward(position, true)?;
                let resume = match machine.instruction_at(end) {
                    Some(HALT) => end,
                    _ => end + 1,
                };
                machine.set_instruction_pointer(resume);
                return Ok(Flow::Jump);
            }
            _ => return Ok(Flow::Unhandled),
        };

        machine.tape_mut().set(value);
        Ok(Flow::Next)
    }
}
