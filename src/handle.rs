//! Opening paths and adopting raw descriptors as combiner handles.
//!
//! Every handle returned here is an owned [`File`]. Standard streams and
//! caller-provided descriptors are duplicated first, so dropping the handle
//! never closes the original descriptor.

use crate::config::STDIN_PATH;
use crate::error::{Error, InvalidArgument, Result};
use std::fs::File;
use std::io;
use std::os::fd::{AsFd, BorrowedFd, RawFd};
use std::path::Path;

/// Open an input for reading. `-` denotes standard input.
pub fn open_input(path: &Path) -> Result<File> {
    if path.as_os_str() == STDIN_PATH {
        return duplicate(io::stdin().as_fd());
    }
    File::open(path).map_err(|e| Error::io("open", e))
}

/// Standard output as an unbuffered handle.
pub fn stdout() -> Result<File> {
    duplicate(io::stdout().as_fd())
}

/// Adopt a caller-owned descriptor as an input.
pub fn input_from_raw_fd(fd: RawFd) -> Result<File> {
    adopt(fd)
}

/// Adopt a caller-owned descriptor as the output.
pub fn output_from_raw_fd(fd: RawFd) -> Result<File> {
    adopt(fd)
}

fn adopt(fd: RawFd) -> Result<File> {
    if fd < 0 {
        return Err(InvalidArgument::BadDescriptor { fd }.into());
    }

    // SAFETY: F_GETFD only inspects the descriptor table.
    if unsafe { libc::fcntl(fd, libc::F_GETFD) } == -1 {
        return Err(InvalidArgument::BadDescriptor { fd }.into());
    }

    // SAFETY: the descriptor was just checked to be open, and it is only
    // borrowed long enough to duplicate it.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    duplicate(borrowed)
}

fn duplicate(fd: BorrowedFd<'_>) -> Result<File> {
    let owned = fd.try_clone_to_owned().map_err(|e| Error::io("dup", e))?;
    Ok(File::from(owned))
}
