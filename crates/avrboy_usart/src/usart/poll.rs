use avrboy_common::InterruptRequester;

use super::Usart;
use crate::endpoint::Readiness;
use crate::registers::{Control, Status};
use crate::Fault;

impl Usart {
    /// Per-tick receive check.
    ///
    /// Probes the input endpoint without blocking. When a byte is waiting
    /// and RXC is not yet set, RXC rises and, if RXCIE is enabled, the
    /// receive line is requested once. While RXC stays set (byte not read
    /// yet) further polls change nothing: the interrupt is edge-triggered.
    ///
    /// A failed probe counts as "no data" and is reported as a fault.
    pub fn poll(&mut self, irq: &mut dyn InterruptRequester) {
        let readiness = match self.input.probe() {
            Ok(readiness) => readiness,
            Err(e) => {
                self.report(Fault::ProbeFailed(e.kind()));
                Readiness::Empty
            }
        };
        self.input_readiness = readiness;

        if readiness != Readiness::Ready || self.status.contains(Status::RXC) {
            return;
        }

        self.status.insert(Status::RXC);
        log::debug!("usart: receive complete");
        if self.control.contains(Control::RXCIE) {
            log::debug!("usart: requesting irq {}", self.config.rx_irq_line);
            irq.request_interrupt(self.config.rx_irq_line);
        }
    }
}
