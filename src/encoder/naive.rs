use super::Encoder;

/// Differences smaller than this are written out as plain `+`/`-` runs
const LOOP_THRESHOLD: usize = 10;

/// Per byte encoder without any tables.
///
/// Cell 0 is a loop counter and cell 1 holds the last printed value, large
/// jumps use a single square root sized multiplication loop.
pub struct NaiveEncoder;

fn push_run(program: &mut String, command: char, times: usize) {
    program.extend(std::iter::repeat(command).take(times));
}

impl Encoder for NaiveEncoder {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn encode(&self, data: &[u8]) -> String {
        let mut program = String::new();
        let mut value = 0i32;

        for &byte in data {
            let diff = byte as i32 - value;
            value = byte as i32;

            if diff == 0 {
                program.push_str(">.<");
                continue;
            }

            let command = if diff > 0 { '+' } else { '-' };
            let magnitude = diff.unsigned_abs() as usize;

            if magnitude < LOOP_THRESHOLD {
                program.push('>');
                push_run(&mut program, command, magnitude);
            } else {
                let factor = (magnitude as f64).sqrt() as usize;

                push_run(&mut program, '+', factor);
                program.push_str("[->");
                push_run(&mut program, command, factor);
                program.push_str("<]>");
                push_run(&mut program, command, magnitude - factor * factor);
            }

            program.push_str(".<");
        }

        // stepping back only to step forward again is a no-op
        program.replace("<>", "")
    }
}
