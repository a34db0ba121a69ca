use std::io::{Read, Write};

use log::trace;

use crate::tape::Tape;

use super::{
    basic::{LOOP_END, LOOP_START},
    extended_type1::HALT,
    Flow, Layer, VmError,
};

/// Where the machine reads its instructions from
#[derive(Debug, Clone, PartialEq)]
pub enum Program {
    /// Plain program text, separate from the data tape
    Text(Vec<u8>),
    /// The program is stored in the tape cells themselves, so data writes rewrite the program
    TapeResident,
}

/// Execution state of one program run: tape, storage register, instruction pointer and IO
pub struct Machine<'io> {
    layer: Layer,
    program: Program,
    tape: Tape,

    /// Scratch register used as the second operand of the extended commands
    storage: u8,

    instruction_pointer: usize,
    in_comment: bool,
    halted: bool,

    steps: usize,
    step_limit: Option<usize>,

    /// Caller owned streams, never closed by the machine
    input: &'io mut dyn Read,
    output: &'io mut dyn Write,
}

impl<'io> Machine<'io> {
    pub fn new(
        layer: Layer,
        code: &[u8],
        input: &'io mut dyn Read,
        output: &'io mut dyn Write,
    ) -> Self {
        let storage = 0;
        let (program, tape) = if layer.is_self_modifying() {
            (Program::TapeResident, Self::tape_resident(storage, code))
        } else {
            (Program::Text(code.to_vec()), Tape::new())
        };

        Self {
            layer,
            program,
            tape,
            storage,
            instruction_pointer: 0,
            in_comment: false,
            halted: false,
            steps: 0,
            step_limit: None,
            input,
            output,
        }
    }

    /// Lay the program out as `[storage, program..., initializer data..., 0]`.
    ///
    /// Initializer data is whatever follows the last `@`, the data pointer starts
    /// on its first cell (or on the trailing zero cell if there is none).
    fn tape_resident(storage: u8, code: &[u8]) -> Tape {
        let mut cells = Vec::with_capacity(code.len() * 2 + 2);
        cells.push(storage);
        cells.extend_from_slice(code);

        let pointer = cells.len();
        if let Some(halt) = code.iter().rposition(|&c| c == HALT) {
            cells.extend_from_slice(&code[halt + 1..]);
        }
        cells.push(0);

        Tape::from_cells(cells, pointer)
    }

    pub fn with_step_limit(mut self, step_limit: Option<usize>) -> Self {
        self.step_limit = step_limit;
        self
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn tape_mut(&mut self) -> &mut Tape {
        &mut self.tape
    }

    pub fn storage(&self) -> u8 {
        self.storage
    }

    pub fn set_storage(&mut self, value: u8) {
        self.storage = value;
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    pub fn set_instruction_pointer(&mut self, position: usize) {
        self.instruction_pointer = position;
    }

    pub fn in_comment(&self) -> bool {
        self.in_comment
    }

    pub fn toggle_comment(&mut self) {
        self.in_comment = !self.in_comment;
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Instruction view over the program, `None` once past the end
    pub fn instruction_at(&self, position: usize) -> Option<u8> {
        match &self.program {
            Program::Text(text) => text.get(position).copied(),
            Program::TapeResident => self.tape.cell_at(position),
        }
    }

    /// Read one byte from the input, `None` at the end of the stream
    pub fn read_byte(&mut self) -> Result<Option<u8>, VmError> {
        Ok((&mut *self.input).bytes().next().transpose()?)
    }

    pub fn write_byte(&mut self, value: u8) -> Result<(), VmError> {
        self.output.write_all(&[value])?;
        Ok(())
    }

    /// Move the data pointer left. Growing the tape at index 0 shifts a tape
    /// resident program right, so the instruction pointer follows it.
    pub fn move_left(&mut self) {
        if self.tape.move_left() && self.program == Program::TapeResident {
            self.instruction_pointer += 1;
        }
    }

    /// Insert a zero cell at the data pointer.
    ///
    /// When the program lives on the tape and the cell lands at or before the
    /// current instruction, the instruction pointer follows it.
    pub fn insert_cell(&mut self) {
        let index = self.tape.insert_at_pointer();
        if self.program == Program::TapeResident && index <= self.instruction_pointer {
            self.instruction_pointer += 1;
        }
    }

    /// Remove the cell at the data pointer, correcting the instruction pointer
    /// so the instruction after the current one is the next to run.
    pub fn remove_cell(&mut self) -> Flow {
        let shifted = self.tape.len() > 1;
        let index = self.tape.remove_at_pointer();
        if self.program != Program::TapeResident || !shifted {
            return Flow::Next;
        }

        if index < self.instruction_pointer {
            self.instruction_pointer -= 1;
            Flow::Next
        } else if index == self.instruction_pointer {
            // the running instruction removed itself, its successor is already under the pointer
            Flow::Jump
        } else {
            Flow::Next
        }
    }

    /// Find the `]` matching the `[` at `start`.
    ///
    /// With `stop_at_halt` the scan gives up on the first `@` and returns its position instead.
    pub fn scan_forward(&self, start: usize, stop_at_halt: bool) -> Result<usize, VmError> {
        let mut depth = 0usize;
        let mut position = start;
        loop {
            match self.instruction_at(position) {
                None => {
                    return Err(VmError::UnmatchedBracket {
                        symbol: LOOP_START as char,
                        other: LOOP_END as char,
                        position: start,
                    })
                }
                Some(LOOP_START) => depth += 1,
                Some(LOOP_END) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(position);
                    }
                }
                Some(HALT) if stop_at_halt => return Ok(position),
                _ => {}
            }
            position += 1;
        }
    }

    /// Find the `[` matching the `]` at `start`
    pub fn scan_backward(&self, start: usize) -> Result<usize, VmError> {
        let mut depth = 0usize;
        let mut position = start;
        loop {
            match self.instruction_at(position) {
                Some(LOOP_END) => depth += 1,
                Some(LOOP_START) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(position);
                    }
                }
                _ => {}
            }

            if position == 0 {
                return Err(VmError::UnmatchedBracket {
                    symbol: LOOP_END as char,
                    other: LOOP_START as char,
                    position: start,
                });
            }
            position -= 1;
        }
    }

    /// Offer the instruction to each command set of the layer, most specific first.
    /// Characters nobody claims are comments.
    fn dispatch(&mut self, instruction: u8) -> Result<Flow, VmError> {
        for handler in self.layer.handlers() {
            let flow = handler.execute(self, instruction)?;
            if flow != Flow::Unhandled {
                return Ok(flow);
            }
        }
        Ok(Flow::Next)
    }

    /// Execute a single instruction, returns false once the program has finished
    pub fn step(&mut self) -> Result<bool, VmError> {
        if self.halted {
            return Ok(false);
        }
        let Some(instruction) = self.instruction_at(self.instruction_pointer) else {
            return Ok(false);
        };

        if let Some(limit) = self.step_limit {
            if self.steps >= limit {
                return Err(VmError::StepLimitExceeded { limit });
            }
        }
        self.steps += 1;

        match self.dispatch(instruction)? {
            Flow::Next | Flow::Unhandled => self.instruction_pointer += 1,
            Flow::Jump => {}
            Flow::Halt => {
                self.halted = true;
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Run until the program halts or runs off the end of its instructions
    pub fn run(&mut self) -> Result<(), VmError> {
        let result = loop {
            match self.step() {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.output.flush()?;

        trace!(
            "{} finished after {} steps (halted: {}, tape length {})",
            self.layer,
            self.steps,
            self.halted,
            self.tape.len()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_programs_start_on_fresh_tape() {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        let machine = Machine::new(Layer::ExtendedType1, b"+$", &mut input, &mut output);
        assert_eq!(machine.program(), &Program::Text(b"+$".to_vec()));
        assert_eq!(machine.tape().cells(), &[0]);
    }

    #[test]
    fn self_modifying_programs_live_on_tape() {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        let machine = Machine::new(Layer::ExtendedType2, b"+.", &mut input, &mut output);
        assert_eq!(machine.program(), &Program::TapeResident);
        assert_eq!(machine.tape().cells(), &[0, b'+', b'.', 0]);
        assert_eq!(machine.tape().pointer(), 3);
        assert_eq!(machine.instruction_at(1), Some(b'+'));
    }

    #[test]
    fn initializer_data_follows_program() {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        let machine = Machine::new(Layer::ExtendedType2, b"[.>]@Hi", &mut input, &mut output);
        let cells = machine.tape().cells();
        assert_eq!(&cells[1..8], b"[.>]@Hi");
        assert_eq!(&cells[8..], &[b'H', b'i', 0]);
        assert_eq!(machine.tape().get(), b'H');
    }

    #[test]
    fn scans_respect_nesting() {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        let machine = Machine::new(Layer::Basic, b"[[-]>[-]]+", &mut input, &mut output);
        assert_eq!(machine.scan_forward(0, false).unwrap(), 8);
        assert_eq!(machine.scan_forward(1, false).unwrap(), 3);
        assert_eq!(machine.scan_backward(8).unwrap(), 0);
        assert_eq!(machine.scan_backward(7).unwrap(), 5);
    }

    #[test]
    fn forward_scan_can_stop_at_halt() {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        let machine = Machine::new(Layer::ExtendedType1, b"[+@]", &mut input, &mut output);
        assert_eq!(machine.scan_forward(0, true).unwrap(), 2);
        assert_eq!(machine.scan_forward(0, false).unwrap(), 3);
    }

    #[test]
    fn step_limit_stops_infinite_loops() {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        let mut machine =
            Machine::new(Layer::Basic, b"+[]", &mut input, &mut output).with_step_limit(Some(100));
        assert!(matches!(
            machine.run(),
            Err(VmError::StepLimitExceeded { limit: 100 })
        ));
        assert_eq!(machine.steps(), 100);
    }

    #[test]
    fn end_of_input_reads_sentinel() {
        let mut input: &[u8] = b"A";
        let mut output = vec![];
        let mut machine = Machine::new(Layer::Basic, b",.,.", &mut input, &mut output);
        machine.run().unwrap();
        assert_eq!(machine.tape().get(), 255);
        drop(machine);
        assert_eq!(output, vec![b'A', 255]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::interpreter::LAYERS;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn random_programs_never_panic(
            code in prop::collection::vec(any::<u8>(), 0..128),
            input in prop::collection::vec(any::<u8>(), 0..16),
            layer in 0usize..4
        ) {
            let mut input: &[u8] = &input;
            let mut output = vec![];
            let mut machine = Machine::new(LAYERS[layer], &code, &mut input, &mut output)
                .with_step_limit(Some(4096));
            let _ = machine.run();
            prop_assert!(machine.steps() <= 4096);
            prop_assert!(machine.tape().pointer() < machine.tape().len());
        }
    }
}
