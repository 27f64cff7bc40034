//! Scratch memory that is wiped on release.
//!
//! The engine keeps at most one octet of each input in memory at a time. That
//! octet, the round accumulator and the per-input state table all live in
//! guards that overwrite their contents with zero when dropped, whichever way
//! the engine returns. Clearing goes through `zeroize`, whose writes are not
//! elided by the optimizer; the clear-on-drop itself is the `Drop` impl of
//! `Zeroizing`, which runs the same `zeroize` call the tests exercise directly.

use crate::config::OCTET_SIZE;
use crate::stream::StreamKind;
use std::ops::{Deref, DerefMut};
use zeroize::{Zeroize, Zeroizing};

/// A single octet buffer, zeroed on drop.
pub(crate) type Octet = Zeroizing<[u8; OCTET_SIZE]>;

/// Allocate a cleared octet buffer.
pub(crate) fn octet() -> Octet {
    Zeroizing::new([0u8; OCTET_SIZE])
}

/// What the engine tracks for one input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct InputState {
    pub kind: StreamKind,
    /// Set the first time the input reports end-of-data.
    pub exhausted: bool,
    /// Where a seekable input is rewound to on wraparound.
    pub restart_offset: u64,
}

impl Zeroize for InputState {
    fn zeroize(&mut self) {
        self.kind = StreamKind::default();
        self.exhausted.zeroize();
        self.restart_offset.zeroize();
    }
}

/// Per-input state for one engine invocation.
///
/// Allocated once at entry, sized to the input count, and wiped (including
/// spare capacity) when dropped.
pub(crate) struct StateTable {
    states: Zeroizing<Vec<InputState>>,
}

impl StateTable {
    pub fn with_capacity(len: usize) -> Self {
        Self {
            states: Zeroizing::new(Vec::with_capacity(len)),
        }
    }

    pub fn push(&mut self, state: InputState) {
        self.states.push(state);
    }
}

impl Deref for StateTable {
    type Target = [InputState];

    fn deref(&self) -> &Self::Target {
        &self.states
    }
}

impl DerefMut for StateTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.states
    }
}
