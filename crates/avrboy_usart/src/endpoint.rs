//! Host-side streams a USART reads from and writes to.
//!
//! The only genuinely platform-divergent question the peripheral asks is
//! "is there a byte I can take without blocking?". Each host stream kind
//! answers it its own way behind [`InputEndpoint::probe`]:
//!
//! - [`MemoryInput`]: bytes left in a buffer.
//! - [`SeekableInput`]: stream position against stream length.
//! - [`FdInput`] (unix): zero-timeout `poll(2)` on a pipe, socket or tty.
//! - [`ConsoleInput`]: first character event in a frontend's event queue.
//!
//! [`host`] picks the right variant for an opened file or standard input.

use std::io::{self, Read, Write};

mod console;
#[cfg(unix)]
mod fd;
pub mod host;
mod memory;
mod seekable;

pub use console::{ConsoleEvent, ConsoleInput};
#[cfg(unix)]
pub use fd::FdInput;
pub use memory::{CaptureOutput, MemoryInput};
pub use seekable::SeekableInput;

/// Outcome of a non-blocking availability check.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Readiness {
    /// At least one byte can be read without blocking.
    Ready,
    /// Nothing right now; more may arrive later.
    #[default]
    Empty,
    /// End of stream. Nothing will arrive from this endpoint again, or at
    /// least not until the host side reopens it.
    Closed,
}

/// Byte source bound to a USART receiver.
pub trait InputEndpoint {
    /// Check for a pending byte.
    ///
    /// Must return promptly and must not lose the byte: whatever `probe`
    /// reports as [`Readiness::Ready`] is what the next
    /// [`read_byte`](Self::read_byte) returns.
    fn probe(&mut self) -> io::Result<Readiness>;

    /// Take exactly one byte.
    fn read_byte(&mut self) -> io::Result<u8>;
}

/// Byte sink bound to a USART transmitter.
pub trait OutputEndpoint {
    /// Write and flush exactly one byte.
    fn write_byte(&mut self, value: u8) -> io::Result<()>;
}

impl<W: Write + ?Sized> OutputEndpoint for W {
    fn write_byte(&mut self, value: u8) -> io::Result<()> {
        self.write_all(&[value])?;
        self.flush()
    }
}

fn read_one<R: Read + ?Sized>(reader: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}
