use super::Usart;
use crate::registers::{Control, Status};
use crate::Fault;

impl Usart {
    /// UCSRnA read. UDRE is always reported: transmit never backs up.
    pub fn read_status(&self) -> u8 {
        let value = (self.status | Status::UDRE).bits();
        log::trace!("UCSRA read {value:#04X}");
        value
    }

    /// UCSRnA write. Only TXC reacts (write-1-to-clear).
    pub fn write_status(&mut self, value: u8) {
        log::trace!("UCSRA write {value:#04X}");
        if Status::from_bits_truncate(value).contains(Status::TXC) {
            self.status.remove(Status::TXC);
        }
    }

    pub fn read_control(&self) -> u8 {
        self.control.bits()
    }

    pub fn write_control(&mut self, value: u8) {
        log::trace!("UCSRB write {value:#04X}");
        self.control = Control::from_bits_retain(value);
    }

    /// UDRn read.
    ///
    /// Returns the received byte if RXC was set, and 0 otherwise. A failed
    /// host read also yields 0 and is reported as a fault.
    pub fn read_data(&mut self) -> u8 {
        match self.receive() {
            Ok(Some(value)) => {
                log::trace!("UDR read {value:#04X}");
                value
            }
            Ok(None) => 0,
            Err(fault) => {
                self.report(fault);
                0
            }
        }
    }

    /// UDRn write. The byte goes straight to the output endpoint; a failed
    /// host write drops it. Either way the frame counts as sent and TXC is
    /// raised.
    pub fn write_data(&mut self, value: u8) {
        log::trace!("UDR write {value:#04X}");
        if let Err(e) = self.output.write_byte(value) {
            self.report(Fault::WriteFailed(e.kind()));
        }
        self.status.insert(Status::TXC);
    }

    /// Consume the byte announced by RXC, if any.
    ///
    /// RXC is dropped before touching the endpoint so that a failed read
    /// cannot leave the flag up and get the same slot read twice.
    fn receive(&mut self) -> Result<Option<u8>, Fault> {
        if !self.status.contains(Status::RXC) {
            return Ok(None);
        }
        self.status.remove(Status::RXC);
        self.input
            .read_byte()
            .map(Some)
            .map_err(|e| Fault::ReadFailed(e.kind()))
    }
}
