use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;

use super::{InputEndpoint, Readiness};

/// Finite in-memory input. Reports [`Readiness::Closed`] once drained.
#[derive(Clone, Debug, Default)]
pub struct MemoryInput {
    data: VecDeque<u8>,
}

impl MemoryInput {
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            data: bytes.as_ref().iter().copied().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl InputEndpoint for MemoryInput {
    fn probe(&mut self) -> io::Result<Readiness> {
        if self.data.is_empty() {
            Ok(Readiness::Closed)
        } else {
            Ok(Readiness::Ready)
        }
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        self.data
            .pop_front()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
    }
}

/// Shared in-memory transmit log.
///
/// Clones share the same log, so one clone can be bound to a USART while
/// another is kept around to inspect what was sent.
#[derive(Clone, Debug, Default)]
pub struct CaptureOutput {
    bytes: Rc<RefCell<Vec<u8>>>,
    writes: Rc<Cell<usize>>,
}

impl CaptureOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }

    /// Number of `write` calls that reached the log.
    pub fn write_calls(&self) -> usize {
        self.writes.get()
    }
}

impl Write for CaptureOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        self.writes.set(self.writes.get() + 1);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
