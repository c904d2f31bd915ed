use std::io::{self, Read, Seek, SeekFrom};

use super::{read_one, InputEndpoint, Readiness};

/// Input backed by a seekable stream, typically a regular file.
///
/// Readiness is decided by comparing the current position against the
/// stream length, so an exhausted file reports [`Readiness::Closed`]
/// instead of hitting end-of-file on a read.
pub struct SeekableInput<R> {
    inner: R,
}

impl<R: Read + Seek> SeekableInput<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> InputEndpoint for SeekableInput<R> {
    fn probe(&mut self) -> io::Result<Readiness> {
        let pos = self.inner.stream_position()?;
        let len = self.inner.seek(SeekFrom::End(0))?;
        if len != pos {
            self.inner.seek(SeekFrom::Start(pos))?;
        }
        if pos < len {
            Ok(Readiness::Ready)
        } else {
            Ok(Readiness::Closed)
        }
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        read_one(&mut self.inner)
    }
}
