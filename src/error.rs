//! Error types for the XOR combiner.

use std::io;
use std::os::unix::io::RawFd;
use thiserror::Error;

/// Result type alias for combiner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while combining streams.
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected before any stream was touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// Querying an input's file type failed.
    #[error("Cannot classify input {index}: {source}")]
    Metadata {
        index: usize,
        #[source]
        source: io::Error,
    },

    /// Read, write, seek or poll failure.
    #[error("{op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },
}

/// The ways a call can be malformed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidArgument {
    /// The input list was empty.
    #[error("no inputs given")]
    NoInputs,

    /// A raw descriptor was negative or not open.
    #[error("bad file descriptor {fd}")]
    BadDescriptor { fd: RawFd },

    /// An input handle failed validation.
    #[error("input {index} is not a valid handle")]
    BadInput { index: usize },
}

impl Error {
    /// Wrap an I/O failure with the name of the operation that produced it.
    pub(crate) fn io(op: &'static str, source: io::Error) -> Self {
        Error::Io { op, source }
    }

    /// The OS error number behind this error, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::InvalidArgument(InvalidArgument::BadDescriptor { .. }) => Some(libc::EBADF),
            Error::InvalidArgument(InvalidArgument::BadInput { .. }) => Some(libc::EBADF),
            Error::InvalidArgument(InvalidArgument::NoInputs) => Some(libc::EINVAL),
            Error::Metadata { source, .. } | Error::Io { source, .. } => source.raw_os_error(),
        }
    }

    /// Process exit status for this error.
    ///
    /// Errors carrying an OS error number exit with that number; the rest
    /// (short writes, partial reads, empty seekable inputs) exit with `EIO`.
    pub fn exit_code(&self) -> i32 {
        self.raw_os_error().unwrap_or(libc::EIO)
    }

    /// Whether this error was raised before any I/O took place.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_uses_errno() {
        let err = Error::io("read", io::Error::from_raw_os_error(libc::EPIPE));
        assert_eq!(err.exit_code(), libc::EPIPE);
    }

    #[test]
    fn test_exit_code_without_errno_is_eio() {
        let err = Error::io("write", io::Error::new(io::ErrorKind::WriteZero, "short write"));
        assert_eq!(err.exit_code(), libc::EIO);
    }

    #[test]
    fn test_invalid_argument_codes() {
        let empty = Error::from(InvalidArgument::NoInputs);
        assert!(empty.is_invalid_argument());
        assert_eq!(empty.exit_code(), libc::EINVAL);

        let bad = Error::from(InvalidArgument::BadDescriptor { fd: -1 });
        assert_eq!(bad.exit_code(), libc::EBADF);
    }

    #[test]
    fn test_display_includes_operation() {
        let err = Error::io("lseek", io::Error::from_raw_os_error(libc::ESPIPE));
        assert!(err.to_string().starts_with("lseek: "));
    }
}
