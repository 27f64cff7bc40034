//! The lockstep XOR engine.
//!
//! Each round reads exactly one octet from every input, in order, XORs them
//! together and writes the result as one output octet. Rounds repeat until a
//! termination condition fires:
//!
//! - [`Mode::StopAtShortest`]: the first input to report end-of-data ends the
//!   run. The round in progress is discarded.
//! - [`Mode::RunToLongest`]: seekable inputs wrap around to their restart
//!   offset and unbounded inputs are waited on. The run ends once every input
//!   has reported end-of-data at least once, which never happens while an
//!   unbounded input is present.
//!
//! Output length always equals the number of completed rounds.

use crate::config::{Mode, OCTET_SIZE};
use crate::error::{Error, InvalidArgument, Result};
use crate::scratch::{self, InputState, Octet, StateTable};
use crate::stream::{Input, StreamKind};
use log::{debug, trace};
use std::io::{self, Write};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// An input ran out in stop-at-shortest mode.
    ShortestExhausted,
    /// Every input has wrapped at least once in run-to-longest mode.
    AllWrapped,
}

/// What a successful run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Completed rounds, which is also the number of octets written.
    pub rounds: u64,
    pub termination: Termination,
}

/// XOR `inputs` together into `output`, one octet per round.
///
/// Arguments are checked before any stream is touched: an empty input list or
/// an input that fails [`Input::validate`] yields [`Error::InvalidArgument`].
/// Any other failure aborts the run; octets already written stay written.
pub fn combine<W, I>(output: &mut W, inputs: &mut [I], mode: Mode) -> Result<Summary>
where
    W: Write + ?Sized,
    I: Input,
{
    if inputs.is_empty() {
        return Err(InvalidArgument::NoInputs.into());
    }
    for (index, input) in inputs.iter().enumerate() {
        if input.validate().is_err() {
            return Err(InvalidArgument::BadInput { index }.into());
        }
    }

    let count = inputs.len();
    let states = classify_all(inputs)?;
    let summary = Engine {
        output,
        inputs,
        states,
        mode,
    }
    .run()?;

    debug!(
        "combined {} inputs into {} octets ({:?})",
        count,
        summary.rounds,
        summary.termination
    );
    Ok(summary)
}

/// Classify every input and record restart offsets for the seekable ones.
fn classify_all<I: Input>(inputs: &mut [I]) -> Result<StateTable> {
    let mut states = StateTable::with_capacity(inputs.len());

    for (index, input) in inputs.iter_mut().enumerate() {
        let kind = input
            .kind()
            .map_err(|source| Error::Metadata { index, source })?;

        let restart_offset = match kind {
            StreamKind::Seekable => input.position().map_err(|e| Error::io("lseek", e))?,
            StreamKind::Unbounded => 0,
        };

        debug!("input {}: {:?}, restart offset {}", index, kind, restart_offset);
        states.push(InputState {
            kind,
            exhausted: false,
            restart_offset,
        });
    }

    Ok(states)
}

/// Outcome of pulling one octet from an input.
enum Pull {
    /// The octet buffer holds a fresh octet.
    Octet,
    /// The input ran out and the run is over.
    Ended,
}

struct Engine<'a, W: ?Sized, I> {
    output: &'a mut W,
    inputs: &'a mut [I],
    states: StateTable,
    mode: Mode,
}

impl<W, I> Engine<'_, W, I>
where
    W: Write + ?Sized,
    I: Input,
{
    fn run(mut self) -> Result<Summary> {
        let mut contributing = self.inputs.len();
        let mut rounds = 0u64;
        let mut octet = scratch::octet();

        loop {
            let mut accumulator = scratch::octet();

            for index in 0..self.inputs.len() {
                match self.pull(index, &mut octet, &mut contributing)? {
                    Pull::Octet => accumulator[0] ^= octet[0],
                    Pull::Ended => {
                        return Ok(Summary {
                            rounds,
                            termination: Termination::ShortestExhausted,
                        })
                    }
                }
            }

            // This round started after the longest input had already ended.
            if contributing == 0 {
                return Ok(Summary {
                    rounds,
                    termination: Termination::AllWrapped,
                });
            }

            write_octet(&mut *self.output, &accumulator)?;
            rounds += 1;
        }
    }

    /// Read the next octet of input `index` into `octet`, handling end-of-data
    /// according to the mode.
    fn pull(&mut self, index: usize, octet: &mut Octet, contributing: &mut usize) -> Result<Pull> {
        loop {
            if read_octet(&mut self.inputs[index], octet)? {
                return Ok(Pull::Octet);
            }

            if !self.mode.is_longest() {
                debug!("input {} exhausted", index);
                return Ok(Pull::Ended);
            }

            let state = &mut self.states[index];
            match state.kind {
                StreamKind::Unbounded => {
                    trace!("input {}: no data, waiting for readiness", index);
                    self.inputs[index]
                        .wait_readable()
                        .map_err(|e| Error::io("poll", e))?;
                }
                StreamKind::Seekable => {
                    trace!("input {}: wrapping to offset {}", index, state.restart_offset);
                    self.inputs[index]
                        .seek_to(state.restart_offset)
                        .map_err(|e| Error::io("lseek", e))?;

                    if !state.exhausted {
                        state.exhausted = true;
                        *contributing -= 1;
                    }

                    if !read_octet(&mut self.inputs[index], octet)? {
                        return Err(Error::io(
                            "read",
                            io::Error::new(
                                io::ErrorKind::UnexpectedEof,
                                format!("input {} has no data at its restart offset", index),
                            ),
                        ));
                    }
                    return Ok(Pull::Octet);
                }
            }
        }
    }
}

/// Read one octet. `Ok(false)` means the read reported end-of-data.
fn read_octet<I: Input>(input: &mut I, octet: &mut Octet) -> Result<bool> {
    match input.read(&mut octet[..]) {
        Ok(0) => Ok(false),
        Ok(OCTET_SIZE) => Ok(true),
        Ok(n) => Err(Error::io(
            "read",
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("partial read of {} bytes", n),
            ),
        )),
        Err(e) => Err(Error::io("read", e)),
    }
}

fn write_octet<W: Write + ?Sized>(output: &mut W, octet: &Octet) -> Result<()> {
    match output.write(&octet[..]) {
        Ok(OCTET_SIZE) => Ok(()),
        Ok(_) => Err(Error::io(
            "write",
            io::Error::new(io::ErrorKind::WriteZero, "short write"),
        )),
        Err(e) => Err(Error::io("write", e)),
    }
}
