use lazy_static::lazy_static;
use log::debug;

/// Number of distinct cell values, the table is `VALUES * VALUES` entries
pub const VALUES: usize = 256;

/// Loop factors are searched in `1..MAX_FACTOR`
const MAX_FACTOR: usize = 40;

lazy_static! {
    static ref SHARED: EncodingTable = EncodingTable::build();
}

/// The process wide table, built on first use
pub fn shared() -> &'static EncodingTable {
    &SHARED
}

/// Shortest known program turning a cell holding `from` into a cell holding `to`.
///
/// Programs only use `+ - > < [ ]` and may end one cell to the right of where
/// they started, so they rely on every cell to the right being zero.
#[derive(Debug, Clone)]
pub struct EncodingTable {
    programs: Vec<String>,
}

fn index(from: usize, to: usize) -> usize {
    from * VALUES + to
}

fn repeat(command: char, times: usize) -> String {
    std::iter::repeat(command).take(times).collect()
}

/// `[` d×`-` `>` n×`+` `<]` `>` and its mirror, the length both share
fn loop_length(d: usize, n: usize) -> usize {
    d + n + 5
}

fn loop_program(countdown: char, d: usize, step: char, n: usize) -> String {
    format!("[{}>{}<]>", repeat(countdown, d), repeat(step, n))
}

impl EncodingTable {
    /// Build the table, applying the loop and combination rules until neither finds anything shorter
    pub fn build() -> Self {
        let mut table = Self::direct();
        let loops = Self::loop_candidates();

        let mut pass = 0;
        loop {
            pass += 1;
            let mut improved = 0;
            for (slot, candidate) in loops.iter().enumerate() {
                if let Some(program) = candidate {
                    if program.len() < table.programs[slot].len() {
                        table.programs[slot] = program.clone();
                        improved += 1;
                    }
                }
            }
            improved += table.combine();

            debug!("Encoding table pass {}: {} shorter programs", pass, improved);
            if improved == 0 {
                break;
            }
        }

        table
    }

    /// Straight runs of `+` or `-`, whichever way round the ring is shorter
    fn direct() -> Self {
        let mut programs = Vec::with_capacity(VALUES * VALUES);
        for from in 0..VALUES {
            for to in 0..VALUES {
                let mut delta = to as i32 - from as i32;
                if delta > 128 {
                    delta -= 256;
                } else if delta < -128 {
                    delta += 256;
                }

                programs.push(if delta >= 0 {
                    repeat('+', delta as usize)
                } else {
                    repeat('-', delta.unsigned_abs() as usize)
                });
            }
        }
        Self { programs }
    }

    /// Shortest multiplication loop for every pair it can reach.
    ///
    /// `[-->+<]>` counts `from` down by `d` while adding `n` to the neighbour,
    /// leaving `k * n` there after the `k` steps it takes to reach zero.
    /// The mirror counts up and subtracts instead. These don't depend on the
    /// rest of the table, so they are only worked out once.
    fn loop_candidates() -> Vec<Option<String>> {
        let mut candidates: Vec<Option<String>> = vec![None; VALUES * VALUES];
        let mut offer = |from: usize, to: usize, length: usize, program: &dyn Fn() -> String| {
            let slot = &mut candidates[index(from, to)];
            if slot.as_ref().map_or(true, |existing| length < existing.len()) {
                *slot = Some(program());
            }
        };

        for d in 1..MAX_FACTOR {
            // steps[v]: fewest iterations k (1..=256) with k * d == v, zero if never
            let mut steps = [0usize; VALUES];
            for k in 1..=VALUES {
                let reached = (k * d) % VALUES;
                if steps[reached] == 0 {
                    steps[reached] = k;
                }
            }

            for from in 1..VALUES {
                for n in 1..MAX_FACTOR {
                    let length = loop_length(d, n);

                    let down = steps[from];
                    if down != 0 {
                        let to = (down * n) % VALUES;
                        offer(from, to, length, &|| loop_program('-', d, '+', n));
                    }

                    let up = steps[VALUES - from];
                    if up != 0 {
                        let to = (VALUES - (up * n) % VALUES) % VALUES;
                        offer(from, to, length, &|| loop_program('+', d, '-', n));
                    }
                }
            }
        }

        candidates
    }

    /// Relax every pair through every intermediate value, returns how many entries got shorter
    fn combine(&mut self) -> usize {
        let mut improved = 0;
        for via in 0..VALUES {
            for from in 0..VALUES {
                let first = self.programs[index(from, via)].len();
                for to in 0..VALUES {
                    let combined = first + self.programs[index(via, to)].len();
                    if combined < self.programs[index(from, to)].len() {
                        let program = format!(
                            "{}{}",
                            self.programs[index(from, via)],
                            self.programs[index(via, to)]
                        );
                        self.programs[index(from, to)] = program;
                        improved += 1;
                    }
                }
            }
        }
        improved
    }

    pub fn get(&self, from: u8, to: u8) -> &str {
        &self.programs[index(from as usize, to as usize)]
    }

    pub fn cost(&self, from: u8, to: u8) -> usize {
        self.get(from, to).len()
    }
}
