//! Interpreters for a family of cumulative Brainf**k dialects, plus encoders
//! that turn arbitrary bytes into short basic programs printing them.
extern crate thiserror;

pub mod encoder;
pub mod interpreter;
pub mod tape;

pub use crate::{
    encoder::{encode, Encoder, ENCODERS},
    interpreter::{run, run_with, select_layer, Layer, Machine, VmError, LAYERS},
    tape::Tape,
};
