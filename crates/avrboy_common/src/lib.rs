//! Plumbing shared by every AvrBoy peripheral.
//!
//! Peripherals never see the CPU core directly. They publish their
//! registers into an [`IoRegistry`], enrol a poll handler that runs once
//! per emulation tick, and raise interrupts through an
//! [`InterruptRequester`].

mod io;
mod irq;

pub use io::{IoMap, IoRegistry, PollFn, ReadFn, WriteFn};
pub use irq::{InterruptRequester, IrqLines, IRQ_LINES};
