use std::collections::BTreeMap;

use crate::InterruptRequester;

/// Read side of a memory-mapped register. Receives the accessed address.
pub type ReadFn = Box<dyn FnMut(u16) -> u8>;
/// Write side of a memory-mapped register. Receives the accessed address
/// and the stored byte.
pub type WriteFn = Box<dyn FnMut(u16, u8)>;
/// Per-tick handler used by peripherals that watch asynchronous host input.
pub type PollFn = Box<dyn FnMut(&mut dyn InterruptRequester)>;

/// The address-space side a peripheral talks to while it is being attached.
///
/// This is deliberately tiny: a peripheral maps each of its registers once
/// and optionally enrols a poll handler. How the table is stored and looked
/// up is the implementor's business.
pub trait IoRegistry {
    /// Bind `read` / `write` to a single data-space address.
    ///
    /// Mapping the same address twice is an integration bug and implementors
    /// are expected to panic.
    fn register_io(&mut self, addr: u16, read: ReadFn, write: WriteFn);

    /// Enrol a handler to be run once per emulation tick.
    fn register_poll(&mut self, poll: PollFn);
}

struct IoHandler {
    read: ReadFn,
    write: WriteFn,
}

/// Dispatch table for memory-mapped IO registers.
///
/// The CPU core forwards every data-space load/store here first. Addresses
/// without a handler come back as `None`/`false` so the caller can fall back
/// to plain SRAM, the same way the bus treats unmapped IO space.
#[derive(Default)]
pub struct IoMap {
    handlers: BTreeMap<u16, IoHandler>,
    pollers: Vec<PollFn>,
}

impl IoMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if some peripheral owns `addr`.
    pub fn is_mapped(&self, addr: u16) -> bool {
        self.handlers.contains_key(&addr)
    }

    /// Number of enrolled poll handlers.
    pub fn poller_count(&self) -> usize {
        self.pollers.len()
    }

    pub fn read8(&mut self, addr: u16) -> Option<u8> {
        let handler = self.handlers.get_mut(&addr)?;
        let value = (handler.read)(addr);
        log::trace!("io read  {addr:#06X} -> {value:#04X}");
        Some(value)
    }

    /// Forward a store to the owning peripheral. Returns `false` when the
    /// address is unmapped and the store was not consumed.
    pub fn write8(&mut self, addr: u16, value: u8) -> bool {
        match self.handlers.get_mut(&addr) {
            Some(handler) => {
                log::trace!("io write {addr:#06X} <- {value:#04X}");
                (handler.write)(addr, value);
                true
            }
            None => false,
        }
    }

    /// Run every enrolled poll handler once, in enrolment order.
    ///
    /// The scheduler calls this exactly once per emulation tick.
    pub fn poll(&mut self, irq: &mut dyn InterruptRequester) {
        for poll in self.pollers.iter_mut() {
            poll(&mut *irq);
        }
    }
}

impl IoRegistry for IoMap {
    fn register_io(&mut self, addr: u16, read: ReadFn, write: WriteFn) {
        assert!(
            !self.handlers.contains_key(&addr),
            "IO address {addr:#06X} is already mapped"
        );
        self.handlers.insert(addr, IoHandler { read, write });
    }

    fn register_poll(&mut self, poll: PollFn) {
        self.pollers.push(poll);
    }
}
