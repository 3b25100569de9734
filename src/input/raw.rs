//! Low-level input collection: raw byte reads from the controlling terminal.
//!
//! Reads are gated by `select(2)` with a poll timeout so the reader thread notices the
//! shutdown flag even when no key is pressed. Bytes are forwarded undecoded; decoding
//! happens on the event loop where the escape timeout is enforced.

use std::fs::File;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Poll timeout used when the caller does not provide one.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
/// Largest chunk handed over in a single read.
const READ_CHUNK: usize = 1024;

/// Blocking reader over the terminal device.
#[derive(Debug)]
pub struct RawInputReader {
    tty: File,
    buffer: [u8; READ_CHUNK],
}

impl RawInputReader {
    pub fn new(tty: File) -> Self {
        Self {
            tty,
            buffer: [0; READ_CHUNK],
        }
    }

    /// Wait up to `timeout` for input, then read whatever is available.
    ///
    /// `Ok(None)` means the timeout expired. End of file is reported as
    /// [`io::ErrorKind::UnexpectedEof`].
    pub fn poll_bytes(&mut self, timeout: Duration) -> io::Result<Option<Vec<u8>>> {
        if !self.wait_for_input(timeout)? {
            return Ok(None);
        }
        match self.tty.read(&mut self.buffer) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "terminal input closed",
            )),
            Ok(n) => Ok(Some(self.buffer[..n].to_vec())),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(err),
        }
    }

    #[cfg(unix)]
    fn wait_for_input(&self, timeout: Duration) -> io::Result<bool> {
        use std::os::unix::io::AsRawFd;

        let fd = self.tty.as_raw_fd();
        let mut read_fds = std::mem::MaybeUninit::<libc::fd_set>::uninit();

        // SAFETY: FD_ZERO initializes the set before FD_SET touches it.
        unsafe {
            libc::FD_ZERO(read_fds.as_mut_ptr());
            libc::FD_SET(fd, read_fds.as_mut_ptr());
        }

        let mut tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: libc::suseconds_t::from(timeout.subsec_micros()),
        };

        // SAFETY: the fd_set was initialized above and the timeval outlives the call.
        let result = unsafe {
            libc::select(
                fd + 1,
                read_fds.as_mut_ptr(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut tv,
            )
        };

        match result {
            -1 => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
            0 => Ok(false),
            _ => Ok(true),
        }
    }

    #[cfg(not(unix))]
    fn wait_for_input(&self, _timeout: Duration) -> io::Result<bool> {
        Ok(true)
    }
}

/// Spawn a blocking thread that reads terminal bytes and forwards them onto a channel.
///
/// The thread exits when `shutdown` is set, when the receiver is dropped, or on a read
/// error; in the last case the channel closes, which the event loop treats as fatal.
pub fn spawn_input_thread(
    mut reader: RawInputReader,
    tx: UnboundedSender<Vec<u8>>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !shutdown.load(Ordering::SeqCst) {
            match reader.poll_bytes(poll_interval) {
                Ok(Some(bytes)) => {
                    if tx.send(bytes).is_err() {
                        break;
                    }
                }
                Ok(None) => continue,
                Err(err) => {
                    log::warn!("input thread stopped: {}", err);
                    break;
                }
            }
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::net::UnixStream;

    // A socket pair stands in for the terminal: select and read behave the same way.
    fn reader_pair() -> (RawInputReader, UnixStream) {
        let (ours, theirs) = UnixStream::pair().expect("socket pair");
        let fd: std::os::fd::OwnedFd = ours.into();
        (RawInputReader::new(File::from(fd)), theirs)
    }

    #[test]
    fn poll_times_out_without_input() {
        let (mut reader, _writer) = reader_pair();
        let result = reader.poll_bytes(Duration::from_millis(10)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn poll_returns_available_bytes() {
        let (mut reader, mut writer) = reader_pair();
        writer.write_all(b"\x1b[A").unwrap();
        let result = reader.poll_bytes(Duration::from_millis(100)).unwrap();
        assert_eq!(result, Some(b"\x1b[A".to_vec()));
    }

    #[test]
    fn closed_input_is_an_error() {
        let (mut reader, writer) = reader_pair();
        drop(writer);
        let err = reader.poll_bytes(Duration::from_millis(100)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn input_thread_forwards_and_stops() {
        let (reader, mut writer) = reader_pair();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = spawn_input_thread(
            reader,
            tx,
            Arc::clone(&shutdown),
            Duration::from_millis(10),
        );

        writer.write_all(b"j").unwrap();
        let bytes = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for input");
        assert_eq!(bytes, Some(b"j".to_vec()));

        shutdown.store(true, Ordering::SeqCst);
        handle.join().expect("input thread panicked");
    }
}
