use std::io::{self, Read};
use std::os::unix::io::AsRawFd;

use super::{InputEndpoint, Readiness};

/// Input backed by a pipe, socket or character device.
///
/// Availability is checked with a zero-timeout `poll(2)`. A readable
/// descriptor is drained one byte into a lookahead slot, which is the only
/// portable way to tell "data" from "end of stream" on pipes, sockets and
/// ttys alike: all three report readable at EOF. The lookahead byte is
/// handed out by the next [`read_byte`](InputEndpoint::read_byte), so
/// nothing is lost or delivered twice.
///
/// A read that fails after the descriptor hung up or reported an error
/// ends the stream: the endpoint reports [`Readiness::Closed`] from then on.
pub struct FdInput<T> {
    inner: T,
    lookahead: Option<u8>,
    broken: bool,
}

impl<T: Read + AsRawFd> FdInput<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            lookahead: None,
            broken: false,
        }
    }

    /// Zero-timeout `poll(2)`. Returns the `revents` bits, 0 when idle.
    fn poll_events(&self) -> io::Result<libc::c_short> {
        let mut pfd = libc::pollfd {
            fd: self.inner.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: `pfd` is a valid, exclusively borrowed pollfd and nfds is 1.
        let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(0);
            }
            return Err(err);
        }
        if rc == 0 {
            return Ok(0);
        }
        if pfd.revents & libc::POLLNVAL != 0 {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        Ok(pfd.revents)
    }
}

impl<T: Read + AsRawFd> InputEndpoint for FdInput<T> {
    fn probe(&mut self) -> io::Result<Readiness> {
        if self.lookahead.is_some() {
            return Ok(Readiness::Ready);
        }
        if self.broken {
            return Ok(Readiness::Closed);
        }
        let events = self.poll_events()?;
        if events & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) == 0 {
            return Ok(Readiness::Empty);
        }
        // poll said readable (or hung up), so this read returns immediately.
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(0) => Ok(Readiness::Closed),
            Ok(_) => {
                self.lookahead = Some(buf[0]);
                Ok(Readiness::Ready)
            }
            Err(e) => match e.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(Readiness::Empty),
                _ if events & (libc::POLLHUP | libc::POLLERR) != 0 => {
                    log::warn!("usart input: read failed after hangup, closing: {e}");
                    self.broken = true;
                    Ok(Readiness::Closed)
                }
                _ => Err(e),
            },
        }
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        if self.lookahead.is_none() {
            self.probe()?;
        }
        self.lookahead
            .take()
            .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
    }
}
