use super::{
    table::{self, EncodingTable},
    Encoder,
};

/// Walks the data using the precomputed [`EncodingTable`]
pub struct OptimizedEncoder;

impl Encoder for OptimizedEncoder {
    fn name(&self) -> &'static str {
        "optimized"
    }

    fn encode(&self, data: &[u8]) -> String {
        encode_with(table::shared(), data)
    }
}

/// For every byte either adjust the current cell or start over on a fresh zero cell,
/// whichever is shorter, then print it.
pub fn encode_with(table: &EncodingTable, data: &[u8]) -> String {
    let mut program = String::new();
    let mut previous = 0u8;

    for &byte in data {
        let in_place = table.get(previous, byte);
        let fresh = table.get(0, byte);

        // cells to the right are never touched, so `>` always lands on a zero
        if in_place.len() <= fresh.len() + 1 {
            program.push_str(in_place);
        } else {
            program.push('>');
            program.push_str(fresh);
        }
        program.push('.');
        previous = byte;
    }

    program
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_bytes_just_print() {
        let program = OptimizedEncoder.encode(&[7, 7, 7]);
        assert!(program.ends_with("..."));
    }

    #[test]
    fn zero_bytes_print_the_fresh_cell() {
        assert_eq!(OptimizedEncoder.encode(&[0, 0]), "..");
    }

    #[test]
    fn uses_table_transitions() {
        let table = table::shared();
        let program = encode_with(table, b"A");
        assert_eq!(program, format!("{}.", table.get(0, b'A')));
    }

    #[test]
    fn never_longer_than_starting_fresh() {
        let table = table::shared();
        let data = b"The quick brown fox";
        let program = encode_with(table, data);
        let fresh: usize = data.iter().map(|&b| table.cost(0, b) + 2).sum();
        assert!(program.len() <= fresh);
    }
}
