use super::{CommandSet, Flow, Machine, VmError};

pub const COMMENT: u8 = b'#';

/// Reserved, currently do nothing
pub const RESERVED: &[u8] = b"XxMmLl:";

/// Hex literals and comment blocks
pub struct ExtendedType3;

fn hex_digit(instruction: u8) -> Option<u8> {
    match instruction {
        b'0'..=b'9' => Some(instruction - b'0'),
        b'A'..=b'F' => Some(instruction - b'A' + 10),
        _ => None,
    }
}

impl CommandSet for ExtendedType3 {
    fn commands(&self) -> &'static [u8] {
        b"XxMmLl:#0123456789ABCDEF"
    }

    fn execute(&self, machine: &mut Machine<'_>, instruction: u8) -> Result<Flow, VmError> {
        if instruction == COMMENT {
            machine.toggle_comment();
            return Ok(Flow::Next);
        }

        // inside a comment every other command is swallowed here before the base sets see it
        if machine.in_comment() || RESERVED.contains(&instruction) {
            return Ok(Flow::Next);
        }

        match hex_digit(instruction) {
            Some(digit) => {
                machine.tape_mut().set(digit as i64 * 16);
                Ok(Flow::Next)
            }
            None => Ok(Flow::Unhandled),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::{run_with, Layer};

    fn run_type3(code: &str) -> Vec<u8> {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        run_with(Layer::ExtendedType3, code.as_bytes(), &mut input, &mut output).unwrap();
        output
    }

    #[test]
    fn hex_literals() {
        assert_eq!(run_type3("8."), vec![128]);
        assert_eq!(run_type3("F."), vec![240]);
        assert_eq!(run_type3("A+."), vec![161]);
        assert_eq!(run_type3("4+."), vec![65]);
    }

    #[test]
    fn lowercase_hex_is_inert() {
        assert_eq!(run_type3("+a."), vec![1]);
    }

    #[test]
    fn comment_blocks() {
        assert_eq!(run_type3("+#+++#."), vec![1]);
        assert_eq!(run_type3("#[#+."), vec![1]);
        assert_eq!(run_type3("#+.#"), Vec::<u8>::new());
    }

    #[test]
    fn reserved_commands_do_nothing() {
        assert_eq!(run_type3("+XxMmLl:."), vec![1]);
    }

    #[test]
    fn inherits_extended_commands() {
        assert_eq!(run_type3("+++++$=."), vec![10]);
        assert_eq!(run_type3("[.>]@Hi"), b"Hi".to_vec());
    }
}
