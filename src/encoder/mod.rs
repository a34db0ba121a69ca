pub mod naive;
pub mod optimized;
pub mod table;

use log::debug;

pub use self::{naive::NaiveEncoder, optimized::OptimizedEncoder, table::EncodingTable};

/// Turns arbitrary bytes into a basic program that prints them
pub trait Encoder: Sync {
    fn name(&self) -> &'static str;

    fn encode(&self, data: &[u8]) -> String;
}

/// Every available encoder, on ties the earlier one wins
pub const ENCODERS: &[&dyn Encoder] = &[&OptimizedEncoder, &NaiveEncoder];

pub fn encoder_by_name(name: &str) -> Option<&'static dyn Encoder> {
    ENCODERS
        .iter()
        .copied()
        .find(|encoder| encoder.name() == name)
}

/// Run every encoder and keep the shortest program
pub fn encode(data: &[u8]) -> String {
    ENCODERS
        .iter()
        .map(|encoder| {
            let program = encoder.encode(data);
            debug!(
                "{} encoder: {} bytes -> {} commands",
                encoder.name(),
                data.len(),
                program.len()
            );
            program
        })
        .min_by_key(String::len)
        .unwrap_or_default()
}
