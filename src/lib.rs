//! Secure XOR
//!
//! Combines any number of input streams by XOR, one octet at a time, in
//! constant memory. At most one octet of each input is resident at once, and
//! every scratch buffer is wiped before it is released.
//!
//! # Features
//!
//! - **Lockstep combining**: round *k* of the output is the XOR of octet *k*
//!   of every input
//! - **Two modes**: stop at the shortest input, or run to the longest one with
//!   seekable inputs wrapping around to where they started
//! - **FIFO-aware**: pipes, sockets and character devices are waited on rather
//!   than rewound
//!
//! # Architecture
//!
//! ```text
//! inputs → classify (stream) → combine (engine) → output
//!                                  ↑
//!                        wiped scratch (scratch)
//! ```
//!
//! # Example
//!
//! ```rust
//! use secure_xor::{combine, Mode};
//! use std::io::Cursor;
//!
//! let mut inputs = vec![Cursor::new(vec![0x01, 0x02]), Cursor::new(vec![0xFF])];
//! let mut output = Vec::new();
//!
//! combine(&mut output, &mut inputs, Mode::RunToLongest).unwrap();
//! assert_eq!(output, vec![0xFE, 0xFD]);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
mod scratch;
pub mod stream;

pub use config::Mode;
pub use engine::{combine, Summary, Termination};
pub use error::{Error, InvalidArgument, Result};
pub use handle::{input_from_raw_fd, open_input, output_from_raw_fd};
pub use stream::{classify, Input, StreamKind};
