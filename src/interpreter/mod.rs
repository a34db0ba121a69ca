pub mod basic;
pub mod extended_type1;
pub mod extended_type2;
pub mod extended_type3;
pub mod machine;

use std::{
    fmt,
    io::{Read, Write},
};

use clap::ValueEnum;
use lazy_static::lazy_static;
use log::debug;
use regex::bytes::Regex;
use thiserror::Error;

use self::{
    basic::Basic, extended_type1::ExtendedType1, extended_type2::ExtendedType2,
    extended_type3::ExtendedType3,
};

pub use self::machine::{Machine, Program};

#[derive(Error, Debug)]
pub enum VmError {
    #[error("IO Error")]
    Io(
        #[from]
        std::io::Error,
    ),

    #[error("Can't find other symbol ({other:}) for {symbol:} at {position:}")]
    UnmatchedBracket {
        symbol: char,
        other: char,
        position: usize,
    },

    #[error("Division by zero at {position:}, the storage register is empty")]
    DivisionByZero { position: usize },

    #[error("Ran out of steps after {limit:} instructions")]
    StepLimitExceeded { limit: usize },
}

/// What the machine does once a command set has looked at an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Not one of ours, fall through to the next (less capable) set
    Unhandled,
    /// Carry on with the following instruction
    Next,
    /// The instruction pointer has already been moved
    Jump,
    /// Stop executing
    Halt,
}

/// A set of single character commands layered on top of a base set.
///
/// Each set only knows the characters it adds, anything else is reported as
/// [`Flow::Unhandled`] so the machine can offer it to the next set in the chain.
pub trait CommandSet: Sync {
    /// The characters this set adds to its base
    fn commands(&self) -> &'static [u8];

    fn execute(&self, machine: &mut Machine<'_>, instruction: u8) -> Result<Flow, VmError>;
}

/// The cumulative instruction sets, each one a strict superset of the previous
#[derive(ValueEnum, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Layer {
    /// `+ - > < [ ] . ,`
    Basic,
    /// Storage register, bit shifts, bitwise ops and `@` halt
    ExtendedType1,
    /// Self modifying programs, cell insertion and storage arithmetic
    ExtendedType2,
    /// Hex literals and `#` comment blocks
    ExtendedType3,
}

/// Every known layer, least capable first
pub const LAYERS: [Layer; 4] = [
    Layer::Basic,
    Layer::ExtendedType1,
    Layer::ExtendedType2,
    Layer::ExtendedType3,
];

// handler chains are tried most specific first
const BASIC_CHAIN: &[&dyn CommandSet] = &[&Basic];
const TYPE1_CHAIN: &[&dyn CommandSet] = &[&ExtendedType1, &Basic];
const TYPE2_CHAIN: &[&dyn CommandSet] = &[&ExtendedType2, &ExtendedType1, &Basic];
const TYPE3_CHAIN: &[&dyn CommandSet] =
    &[&ExtendedType3, &ExtendedType2, &ExtendedType1, &Basic];

impl Layer {
    pub fn most_capable() -> Layer {
        Layer::ExtendedType3
    }

    pub fn handlers(self) -> &'static [&'static dyn CommandSet] {
        match self {
            Layer::Basic => BASIC_CHAIN,
            Layer::ExtendedType1 => TYPE1_CHAIN,
            Layer::ExtendedType2 => TYPE2_CHAIN,
            Layer::ExtendedType3 => TYPE3_CHAIN,
        }
    }

    /// Every character this layer recognises, base commands first
    pub fn supported_commands(self) -> Vec<u8> {
        self.handlers()
            .iter()
            .rev()
            .flat_map(|handler| handler.commands().iter().copied())
            .collect()
    }

    pub fn supports(self, instruction: u8) -> bool {
        self.handlers()
            .iter()
            .any(|handler| handler.commands().contains(&instruction))
    }

    /// From type 2 onwards the program lives on the tape and can rewrite itself
    pub fn is_self_modifying(self) -> bool {
        matches!(self, Layer::ExtendedType2 | Layer::ExtendedType3)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layer::Basic => "basic",
            Layer::ExtendedType1 => "extended type 1",
            Layer::ExtendedType2 => "extended type 2",
            Layer::ExtendedType3 => "extended type 3",
        })
    }
}

lazy_static! {
    // two or more hex-like characters in a row are far more likely to be a comment than code
    static ref HEX_RUN: Regex = Regex::new("[A-F0-9]{2,}").unwrap();
}

/// Reduce program text to the characters that decide which layer it needs.
///
/// Everything after the first `@` is data, anything no layer knows is a comment
/// and runs of hex-like characters are treated as comment noise.
pub fn sanitize(code: &[u8]) -> Vec<u8> {
    let end = code
        .iter()
        .position(|&c| c == extended_type1::HALT)
        .unwrap_or(code.len());
    let most_capable = Layer::most_capable();
    let filtered: Vec<u8> = code[..end]
        .iter()
        .copied()
        .filter(|&c| most_capable.supports(c))
        .collect();

    HEX_RUN.replace_all(&filtered, &b""[..]).into_owned()
}

/// Pick the least capable layer that still understands every command in the program
pub fn select_layer(code: &[u8]) -> Layer {
    let sanitized = sanitize(code);
    let layer = LAYERS
        .iter()
        .copied()
        .filter(|layer| sanitized.iter().all(|&c| layer.supports(c)))
        .min_by_key(|layer| layer.supported_commands().len())
        .unwrap_or_else(Layer::most_capable);

    debug!(
        "Selected {} for {} sanitized commands",
        layer,
        sanitized.len()
    );
    layer
}

/// Programs made of nothing but whitespace do nothing under any layer
pub fn is_blank(code: &[u8]) -> bool {
    code.iter().all(u8::is_ascii_whitespace)
}

/// Run the program under a specific layer
pub fn run_with(
    layer: Layer,
    code: &[u8],
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> Result<(), VmError> {
    Machine::new(layer, code, input, output).run()
}

/// Detect the layer the program needs and run the unfiltered text under it.
/// Returns the layer that was used.
pub fn run(code: &[u8], input: &mut dyn Read, output: &mut dyn Write) -> Result<Layer, VmError> {
    if is_blank(code) {
        return Ok(Layer::Basic);
    }

    let layer = select_layer(code);
    run_with(layer, code, input, output)?;
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_layer(layer: Layer, code: &str) -> Result<Vec<u8>, VmError> {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        run_with(layer, code.as_bytes(), &mut input, &mut output)?;
        Ok(output)
    }

    #[test]
    fn supported_command_counts() {
        let counts: Vec<usize> = LAYERS
            .iter()
            .map(|layer| layer.supported_commands().len())
            .collect();
        assert_eq!(counts, vec![8, 17, 25, 49]);
    }

    #[test]
    fn layers_are_cumulative() {
        for pair in LAYERS.windows(2) {
            let (base, extended) = (pair[0], pair[1]);
            for command in base.supported_commands() {
                assert!(extended.supports(command), "{extended} lacks {}", command as char);
            }
        }
    }

    #[test]
    fn lowercase_hex_is_not_a_command() {
        assert!(Layer::ExtendedType3.supports(b'A'));
        assert!(!Layer::ExtendedType3.supports(b'a'));
    }

    #[test]
    fn sanitize_drops_data_and_hex_runs() {
        assert_eq!(sanitize(b"+hi[-]@$$$"), b"+[-]".to_vec());
        assert_eq!(sanitize(b"+ADD 5-"), b"+-".to_vec());
        assert_eq!(sanitize(b"+DEADBEEF-"), b"+-".to_vec());
    }

    #[test]
    fn selects_basic_for_plain_programs() {
        assert_eq!(select_layer(b"++[>+<-]>."), Layer::Basic);
        // the halt marker and everything after it is ignored for selection
        assert_eq!(select_layer(b"+.@$!~"), Layer::Basic);
    }

    #[test]
    fn selects_least_capable_layer() {
        assert_eq!(select_layer(b"+$!."), Layer::ExtendedType1);
        assert_eq!(select_layer(b"+$*."), Layer::ExtendedType2);
        assert_eq!(select_layer(b"5."), Layer::ExtendedType3);
        assert_eq!(select_layer(b"+#comment#."), Layer::ExtendedType3);
    }

    #[test]
    fn hex_runs_do_not_force_type3() {
        assert_eq!(select_layer(b"FF++."), Layer::Basic);
    }

    #[test]
    fn whitespace_program_does_nothing() {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        let layer = run(b"  \n\t", &mut input, &mut output).unwrap();
        assert_eq!(layer, Layer::Basic);
        assert!(output.is_empty());
    }

    #[test]
    fn blank_programs() {
        assert!(is_blank(b""));
        assert!(is_blank(b" \r\n\t"));
        assert!(!is_blank(b" + "));
    }

    #[test]
    fn run_reports_selected_layer() {
        let mut input: &[u8] = &[];
        let mut output = vec![];
        let layer = run(b"8+.", &mut input, &mut output).unwrap();
        assert_eq!(layer, Layer::ExtendedType3);
        assert_eq!(output, vec![129]);
    }

    #[test]
    fn unmatched_brackets_are_reported() {
        assert!(matches!(
            run_layer(Layer::Basic, "[++"),
            Err(VmError::UnmatchedBracket { symbol: '[', .. })
        ));
        assert!(matches!(
            run_layer(Layer::Basic, "++]"),
            Err(VmError::UnmatchedBracket { symbol: ']', .. })
        ));
        assert!(matches!(
            run_layer(Layer::ExtendedType2, "++]"),
            Err(VmError::UnmatchedBracket { .. })
        ));
    }
}
