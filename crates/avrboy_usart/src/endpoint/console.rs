use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use super::{InputEndpoint, Readiness};

/// Raw console input record, as delivered by a windowed or terminal
/// frontend.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsoleEvent {
    /// A key transition. `ch` is `None` for keys that produce no character
    /// (shift, ctrl, arrows, function keys).
    Key { down: bool, ch: Option<u8> },
    Focus(bool),
    Resize { cols: u16, rows: u16 },
}

impl ConsoleEvent {
    /// The byte this event types, if any. Only key presses with a non-NUL
    /// character count.
    pub fn typed_byte(self) -> Option<u8> {
        match self {
            ConsoleEvent::Key {
                down: true,
                ch: Some(ch),
            } if ch != 0 => Some(ch),
            _ => None,
        }
    }
}

/// Console-style input fed through a channel of [`ConsoleEvent`]s.
///
/// Probing skips over everything that does not type a character (key
/// releases, modifier-only presses, focus and resize records) and parks the
/// first typed byte until it is read. Skipped records are never delivered
/// as data.
pub struct ConsoleInput {
    events: Receiver<ConsoleEvent>,
    pending: Option<u8>,
}

impl ConsoleInput {
    /// Create the endpoint and the sender the frontend pushes events into.
    /// Dropping every sender closes the console.
    pub fn new() -> (Self, Sender<ConsoleEvent>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                events: rx,
                pending: None,
            },
            tx,
        )
    }
}

impl InputEndpoint for ConsoleInput {
    fn probe(&mut self) -> io::Result<Readiness> {
        if self.pending.is_some() {
            return Ok(Readiness::Ready);
        }
        loop {
            match self.events.try_recv() {
                Ok(event) => match event.typed_byte() {
                    Some(byte) => {
                        self.pending = Some(byte);
                        return Ok(Readiness::Ready);
                    }
                    None => log::trace!("console: discarding {event:?}"),
                },
                Err(TryRecvError::Empty) => return Ok(Readiness::Empty),
                Err(TryRecvError::Disconnected) => return Ok(Readiness::Closed),
            }
        }
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        if self.pending.is_none() {
            self.probe()?;
        }
        self.pending
            .take()
            .ok_or_else(|| io::Error::from(io::ErrorKind::WouldBlock))
    }
}
