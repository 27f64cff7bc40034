//! Input stream classification and the read-side abstraction used by the engine.
//!
//! Every input is inspected once, before any payload is read, and sorted into
//! one of two kinds:
//!
//! - **Seekable**: regular files, directories and block devices. End-of-data is
//!   genuine, and the stream can be rewound to replay its contents.
//! - **Unbounded**: character devices, named pipes and sockets. A zero-length
//!   read may only mean "nothing yet", and the stream cannot be rewound.

use log::trace;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::os::unix::fs::FileTypeExt;
use std::os::unix::io::AsRawFd;

/// How an input behaves at end-of-data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamKind {
    /// Finite and rewindable.
    #[default]
    Seekable,
    /// FIFO-like; never rewound, waited on instead.
    Unbounded,
}

impl StreamKind {
    /// Classify a file type. Character devices, FIFOs and sockets are unbounded.
    pub fn from_file_type(file_type: std::fs::FileType) -> Self {
        if file_type.is_char_device() || file_type.is_fifo() || file_type.is_socket() {
            StreamKind::Unbounded
        } else {
            StreamKind::Seekable
        }
    }
}

/// Classify an open file by its type. Consumes no payload bytes.
pub fn classify(file: &File) -> io::Result<StreamKind> {
    Ok(StreamKind::from_file_type(file.metadata()?.file_type()))
}

/// A readable source the engine can combine.
///
/// Implementations are driven one octet at a time through [`Read`]; the
/// remaining methods back classification, wraparound and readiness waiting.
pub trait Input: Read {
    /// Check that the handle is usable. Called before any I/O.
    fn validate(&self) -> io::Result<()> {
        Ok(())
    }

    /// Determine the stream's kind.
    fn kind(&self) -> io::Result<StreamKind>;

    /// Current read offset. Only called on seekable inputs.
    fn position(&mut self) -> io::Result<u64>;

    /// Move the read offset to `offset`. Only called on seekable inputs.
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Block until the stream is readable. Only called on unbounded inputs.
    fn wait_readable(&self) -> io::Result<()>;
}

impl Input for File {
    fn validate(&self) -> io::Result<()> {
        // SAFETY: F_GETFD only inspects the descriptor table.
        if unsafe { libc::fcntl(self.as_raw_fd(), libc::F_GETFD) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn kind(&self) -> io::Result<StreamKind> {
        classify(self)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn wait_readable(&self) -> io::Result<()> {
        poll_readable(self.as_raw_fd())
    }
}

/// Wait on `poll(2)` with no timeout until `fd` reports readiness.
///
/// Hang-up and error conditions count as ready: the following read reports
/// them. A return with no events is retried. `EINTR` is surfaced.
///
/// Once the writing end of a pipe or socket is gone, every call returns at
/// once with `POLLHUP` and every read returns zero, so a run-to-longest run
/// over such an input spins without blocking until it is cancelled.
fn poll_readable(fd: libc::c_int) -> io::Result<()> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    loop {
        pfd.revents = 0;
        // SAFETY: `pfd` is a single valid pollfd for the duration of the call.
        let ready = unsafe { libc::poll(&mut pfd, 1, -1) };

        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        if pfd.revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        if ready > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0 {
            if pfd.revents & libc::POLLHUP != 0 {
                trace!("fd {}: hung up, readiness wait will not block", fd);
            }
            return Ok(());
        }
    }
}

/// In-memory inputs are always seekable.
impl<T: AsRef<[u8]>> Input for Cursor<T> {
    fn kind(&self) -> io::Result<StreamKind> {
        Ok(StreamKind::Seekable)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(Cursor::position(self))
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.set_position(offset);
        Ok(())
    }

    fn wait_readable(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<I: Input + ?Sized> Input for &mut I {
    fn validate(&self) -> io::Result<()> {
        (**self).validate()
    }

    fn kind(&self) -> io::Result<StreamKind> {
        (**self).kind()
    }

    fn position(&mut self) -> io::Result<u64> {
        (**self).position()
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        (**self).seek_to(offset)
    }

    fn wait_readable(&self) -> io::Result<()> {
        (**self).wait_readable()
    }
}

impl<I: Input + ?Sized> Input for Box<I> {
    fn validate(&self) -> io::Result<()> {
        (**self).validate()
    }

    fn kind(&self) -> io::Result<StreamKind> {
        (**self).kind()
    }

    fn position(&mut self) -> io::Result<u64> {
        (**self).position()
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        (**self).seek_to(offset)
    }

    fn wait_readable(&self) -> io::Result<()> {
        (**self).wait_readable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::fd::{FromRawFd, OwnedFd};
    use std::os::unix::net::UnixStream;
    use tempfile::{NamedTempFile, TempDir};

    /// Anonymous pipe as (read end, write end).
    fn pipe() -> (File, File) {
        let mut fds = [0 as libc::c_int; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        unsafe {
            (
                File::from(OwnedFd::from_raw_fd(fds[0])),
                File::from(OwnedFd::from_raw_fd(fds[1])),
            )
        }
    }

    #[test]
    fn test_regular_file_is_seekable() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();

        assert_eq!(classify(file.as_file()).unwrap(), StreamKind::Seekable);
    }

    #[test]
    fn test_directory_is_seekable() {
        let dir = TempDir::new().unwrap();
        let handle = File::open(dir.path()).unwrap();

        assert_eq!(classify(&handle).unwrap(), StreamKind::Seekable);
    }

    #[test]
    fn test_char_device_is_unbounded() {
        let null = File::open("/dev/null").unwrap();
        assert_eq!(classify(&null).unwrap(), StreamKind::Unbounded);
    }

    #[test]
    fn test_fifo_is_unbounded() {
        let (reader, writer) = pipe();

        assert_eq!(classify(&reader).unwrap(), StreamKind::Unbounded);
        assert_eq!(classify(&writer).unwrap(), StreamKind::Unbounded);
    }

    #[test]
    fn test_wait_readable_on_pipe_with_data() {
        let (reader, mut writer) = pipe();
        writer.write_all(b"?").unwrap();

        reader.wait_readable().unwrap();
    }

    #[test]
    fn test_socket_is_unbounded() {
        let (left, _right) = UnixStream::pair().unwrap();
        let file = File::from(std::os::fd::OwnedFd::from(left));

        assert_eq!(classify(&file).unwrap(), StreamKind::Unbounded);
    }

    #[test]
    fn test_classify_consumes_nothing() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"xyz").unwrap();
        let mut handle = File::open(file.path()).unwrap();

        classify(&handle).unwrap();

        let mut buf = Vec::new();
        handle.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"xyz");
    }

    #[test]
    fn test_file_position_and_seek() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"0123").unwrap();
        let mut handle = File::open(file.path()).unwrap();

        let mut octet = [0u8; 1];
        handle.read_exact(&mut octet).unwrap();
        assert_eq!(Input::position(&mut handle).unwrap(), 1);

        handle.seek_to(3).unwrap();
        handle.read_exact(&mut octet).unwrap();
        assert_eq!(octet, *b"3");
    }

    #[test]
    fn test_wait_readable_returns_once_data_is_queued() {
        let (left, mut right) = UnixStream::pair().unwrap();
        right.write_all(b"!").unwrap();
        let file = File::from(std::os::fd::OwnedFd::from(left));

        file.wait_readable().unwrap();
    }

    #[test]
    fn test_wait_readable_returns_on_hangup() {
        let (left, right) = UnixStream::pair().unwrap();
        drop(right);
        let file = File::from(std::os::fd::OwnedFd::from(left));

        file.wait_readable().unwrap();
    }

    #[test]
    fn test_cursor_input() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        assert_eq!(cursor.kind().unwrap(), StreamKind::Seekable);

        cursor.seek_to(2).unwrap();
        assert_eq!(Input::position(&mut cursor).unwrap(), 2);
    }
}
