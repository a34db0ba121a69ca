use super::{CommandSet, Flow, Machine, VmError};

pub const INCREMENT: u8 = b'+';
pub const DECREMENT: u8 = b'-';
pub const MOVE_RIGHT: u8 = b'>';
pub const MOVE_LEFT: u8 = b'<';
pub const LOOP_START: u8 = b'[';
pub const LOOP_END: u8 = b']';
pub const WRITE: u8 = b'.';
pub const READ: u8 = b',';

/// Value stored by `,` once the input is exhausted (before reduction, i.e. `255`)
pub const END_OF_INPUT: i64 = -1;

/// The eight classic commands
pub struct Basic;

impl CommandSet for Basic {
    fn commands(&self) -> &'static [u8] {
        &[
            INCREMENT, DECREMENT, MOVE_RIGHT, MOVE_LEFT, LOOP_START, LOOP_END, WRITE, READ,
        ]
    }

    fn execute(&self, machine: &mut Machine<'_>, instruction: u8) -> Result<Flow, VmError> {
        match instruction {
            INCREMENT => machine.tape_mut().add(1),
            DECREMENT => machine.tape_mut().add(-1),
            MOVE_RIGHT => machine.tape_mut().move_right(),
            MOVE_LEFT => machine.move_left(),
            WRITE => {
                let value = machine.tape().get();
                machine.write_byte(value)?;
            }
            READ => {
                let value = machine
                    .read_byte()?
                    .map_or(END_OF_INPUT, |byte| byte as i64);
                machine.tape_mut().set(value);
            }
            LOOP_START => {
                if machine.tape().get() == 0 {
                    // brackets are matched every time since the program may have rewritten itself
                    let end = machine.scan_forward(machine.instruction_pointer(), false)?;
                    machine.set_instruction_pointer(end + 1);
                    return Ok(Flow::Jump);
                }
            }
            LOOP_END => {
                // always jump back to the `[` so it can re-check the cell
                let start = machine.scan_backward(machine.instruction_pointer())?;
                machine.set_instruction_pointer(start);
                return Ok(Flow::Jump);
            }
            _ => return Ok(Flow::Unhandled),
        }

        Ok(Flow::Next)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::{run_with, Layer, VmError};

    fn run_basic(code: &str, input: &str) -> Result<String, VmError> {
        let mut input = input.as_bytes();
        let mut output = vec![];
        run_with(Layer::Basic, code.as_bytes(), &mut input, &mut output)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    #[test]
    fn hello_world() {
        let code = ">+++++++++[<++++++++>-]<.>+++++++[<++++>-]<+.+++++++..+++.>>>++++++++[<++++>-]<.>>>++++++++++[<+++++++++>-]<---.<<<<.+++.------.--------.>>+.";
        assert_eq!(run_basic(code, "").unwrap(), "Hello World!");
    }

    #[test]
    fn cell_wrapping() {
        assert_eq!(run_basic("-[------->+<]>-.", "").unwrap(), "H");
    }

    #[test]
    fn loop_skipping() {
        assert_eq!(
            run_basic("++++++++++[->+++++++<][>++++<]>.", "").unwrap(),
            "F"
        );
    }

    #[test]
    fn echoes_input() {
        assert_eq!(run_basic(",[.,]", "echo").unwrap(), "echo");
    }

    #[test]
    fn unknown_characters_are_comments() {
        assert_eq!(run_basic("this is +++ a comment .", "").unwrap(), "\u{3}");
    }

    #[test]
    fn extended_commands_are_inert() {
        assert_eq!(run_basic("+++$!~{}.", "").unwrap(), "\u{3}");
    }
}
