/// Number of interrupt lines tracked by [`IrqLines`].
///
/// The largest megaAVR vector table (ATmega2560, 57 vectors including
/// reset) fits in one `u64`.
pub const IRQ_LINES: u8 = 64;

/// Something that can assert an interrupt line towards the CPU core.
///
/// Peripherals only *request* interrupts. Masking beyond their own enable
/// bits, priority and vector dispatch belong to the CPU core.
pub trait InterruptRequester {
    fn request_interrupt(&mut self, line: u8);
}

impl<F: FnMut(u8)> InterruptRequester for F {
    fn request_interrupt(&mut self, line: u8) {
        self(line)
    }
}

/// Pending-interrupt latch, one bit per line.
///
/// Requests are level-stored until the CPU core acknowledges them, much
/// like an interrupt flag register. Lower line numbers have priority, which
/// matches the AVR vector table ordering.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IrqLines {
    pending: u64,
}

impl IrqLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, line: u8) {
        assert!(line < IRQ_LINES, "interrupt line {line} out of range");
        log::debug!("irq {line} requested");
        self.pending |= 1u64 << line;
    }

    pub fn is_pending(&self, line: u8) -> bool {
        line < IRQ_LINES && self.pending & (1u64 << line) != 0
    }

    pub fn any_pending(&self) -> bool {
        self.pending != 0
    }

    /// Drop a pending request without servicing it.
    pub fn acknowledge(&mut self, line: u8) {
        if line < IRQ_LINES {
            self.pending &= !(1u64 << line);
        }
    }

    /// Pop the highest-priority (lowest-numbered) pending line.
    pub fn take_next(&mut self) -> Option<u8> {
        if self.pending == 0 {
            return None;
        }
        let line = self.pending.trailing_zeros() as u8;
        self.pending &= !(1u64 << line);
        Some(line)
    }
}

impl InterruptRequester for IrqLines {
    fn request_interrupt(&mut self, line: u8) {
        self.request(line);
    }
}
