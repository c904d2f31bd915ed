use avrboy_common::{IoMap, IrqLines};
use avrboy_usart::{Control, Status, UsartConfig};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FirmwareMode {
    /// Busy-wait on RXC in UCSRnA.
    #[default]
    Echo,
    /// Enable RXCIE and echo from the receive interrupt.
    EchoIrq,
}

/// Serial echo program, written against the register interface only.
///
/// It stands in for a CPU running
///
/// ```text
/// loop { while !(UCSR0A & RXC) {}; UDR0 = UDR0; UCSR0A = TXC; }
/// ```
///
/// or its interrupt-driven equivalent.
pub struct EchoFirmware {
    mode: FirmwareMode,
    regs: UsartConfig,
    echoed: u64,
}

impl EchoFirmware {
    pub fn new(mode: FirmwareMode, regs: UsartConfig) -> Self {
        Self {
            mode,
            regs,
            echoed: 0,
        }
    }

    pub fn echoed(&self) -> u64 {
        self.echoed
    }

    /// Reset-time setup: enable the receiver and transmitter, plus the
    /// receive interrupt in interrupt mode.
    pub fn boot(&mut self, io: &mut IoMap) {
        let mut control = Control::RXEN | Control::TXEN;
        if self.mode == FirmwareMode::EchoIrq {
            control |= Control::RXCIE;
        }
        io.write8(self.regs.control_addr, control.bits());
    }

    pub fn step(&mut self, io: &mut IoMap, irq: &mut IrqLines) {
        match self.mode {
            FirmwareMode::Echo => {
                if self.status(io).contains(Status::RXC) {
                    self.echo(io);
                }
            }
            FirmwareMode::EchoIrq => {
                while let Some(line) = irq.take_next() {
                    if line == self.regs.rx_irq_line {
                        self.echo(io);
                    } else {
                        log::warn!("firmware: no handler for irq {line}");
                    }
                }
            }
        }
    }

    fn status(&self, io: &mut IoMap) -> Status {
        Status::from_bits_truncate(io.read8(self.regs.status_addr).unwrap_or(0))
    }

    fn echo(&mut self, io: &mut IoMap) {
        let Some(byte) = io.read8(self.regs.data_addr) else {
            return;
        };
        // UDRE is always set on this USART, but real firmware checks it.
        if self.status(io).contains(Status::UDRE) {
            io.write8(self.regs.data_addr, byte);
            io.write8(self.regs.status_addr, Status::TXC.bits());
            self.echoed += 1;
        }
    }
}
