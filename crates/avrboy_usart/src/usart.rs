use std::cell::RefCell;
use std::rc::Rc;

use avrboy_common::{InterruptRequester, IoRegistry};

use crate::endpoint::{host, InputEndpoint, OutputEndpoint, Readiness};
use crate::registers::{Control, Status};
use crate::{Fault, UsartConfig, UsartError};

mod poll;
mod regs;

/// Diagnostic callback for absorbed host I/O failures.
///
/// The hook runs inside the register or poll handler that hit the fault,
/// while the [`SharedUsart`] is mutably borrowed. It must not borrow the
/// same USART again: record what it needs and act on it after the access
/// returns.
pub type FaultHook = Box<dyn FnMut(&Fault)>;

/// A USART shared between its register handlers and its poll handler.
///
/// Everything runs on the emulation thread, so `Rc<RefCell<_>>` is all the
/// serialization the peripheral needs: RXC's set-on-poll and
/// clear-on-read can never interleave.
pub type SharedUsart = Rc<RefCell<Usart>>;

/// USART0-style serial peripheral.
///
/// Register semantics (see [`Status`] and [`Control`]):
///
/// - UCSRnA reads with UDRE forced on. Writing a 1 to TXC clears it; every
///   other written bit is ignored.
/// - UCSRnB is plain storage. RXCIE gates the receive interrupt.
/// - Reading UDRn while RXC is set clears RXC and takes one byte from the
///   input endpoint. Reading it otherwise yields 0 and consumes nothing.
/// - Writing UDRn sends one byte to the output endpoint and sets TXC.
///
/// Input is discovered by [`poll`](Usart::poll), which the scheduler runs
/// once per tick. Host read/write failures never reach the emulated
/// program; they become [`Fault`]s on the log and the optional fault hook.
pub struct Usart {
    config: UsartConfig,
    status: Status,
    control: Control,
    input: Box<dyn InputEndpoint>,
    output: Box<dyn OutputEndpoint>,
    /// Result of the most recent input probe.
    input_readiness: Readiness,
    fault_hook: Option<FaultHook>,
    attached: bool,
}

impl Usart {
    pub fn new(
        config: UsartConfig,
        input: Box<dyn InputEndpoint>,
        output: Box<dyn OutputEndpoint>,
    ) -> Self {
        Self {
            config,
            status: Status::empty(),
            control: Control::empty(),
            input,
            output,
            input_readiness: Readiness::Empty,
            fault_hook: None,
            attached: false,
        }
    }

    /// USART bound to the process's standard input and output.
    ///
    /// Fails if standard input is a stream kind that cannot be probed
    /// without blocking on this host.
    pub fn stdio(config: UsartConfig) -> Result<Self, UsartError> {
        let input = host::stdin()?;
        Ok(Self::new(config, input, Box::new(std::io::stdout())))
    }

    pub fn into_shared(self) -> SharedUsart {
        Rc::new(RefCell::new(self))
    }

    /// Map the three registers into `io` and enrol the poll handler.
    ///
    /// # Panics
    ///
    /// If this USART is already attached, or if `io` panics because one of
    /// the configured addresses is already taken.
    pub fn attach(this: &SharedUsart, io: &mut dyn IoRegistry) {
        let config = {
            let mut usart = this.borrow_mut();
            assert!(!usart.attached, "USART is already attached to an IO map");
            usart.attached = true;
            usart.config
        };

        let (r, w) = (Rc::clone(this), Rc::clone(this));
        io.register_io(
            config.status_addr,
            Box::new(move |_| r.borrow().read_status()),
            Box::new(move |_, value| w.borrow_mut().write_status(value)),
        );

        let (r, w) = (Rc::clone(this), Rc::clone(this));
        io.register_io(
            config.control_addr,
            Box::new(move |_| r.borrow().read_control()),
            Box::new(move |_, value| w.borrow_mut().write_control(value)),
        );

        let (r, w) = (Rc::clone(this), Rc::clone(this));
        io.register_io(
            config.data_addr,
            Box::new(move |_| r.borrow_mut().read_data()),
            Box::new(move |_, value| w.borrow_mut().write_data(value)),
        );

        let p = Rc::clone(this);
        io.register_poll(Box::new(move |irq: &mut dyn InterruptRequester| {
            p.borrow_mut().poll(irq)
        }));

        log::info!(
            "usart attached: UCSRA={:#06X} UCSRB={:#06X} UDR={:#06X} rx irq {}",
            config.status_addr,
            config.control_addr,
            config.data_addr,
            config.rx_irq_line
        );
    }

    pub fn config(&self) -> &UsartConfig {
        &self.config
    }

    /// Stored status flags, without the forced UDRE of a register read.
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn input_readiness(&self) -> Readiness {
        self.input_readiness
    }

    /// Rebind the receiver. A pending RXC survives: the next UDR read takes
    /// its byte from the new endpoint.
    pub fn set_input(&mut self, input: Box<dyn InputEndpoint>) {
        log::debug!("usart input endpoint replaced");
        self.input = input;
        self.input_readiness = Readiness::Empty;
    }

    pub fn set_output(&mut self, output: Box<dyn OutputEndpoint>) {
        log::debug!("usart output endpoint replaced");
        self.output = output;
    }

    /// Install (or remove, with `None`) the diagnostic hook for absorbed
    /// host I/O failures.
    pub fn set_fault_hook(&mut self, hook: Option<FaultHook>) {
        self.fault_hook = hook;
    }

    fn report(&mut self, fault: Fault) {
        log::warn!("usart: {fault}");
        if let Some(hook) = self.fault_hook.as_mut() {
            hook(&fault);
        }
    }
}

#[cfg(test)]
mod tests;
