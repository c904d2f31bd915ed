//! Host runner for AvrBoy peripherals.
//!
//! There is no AVR core in this workspace yet, so the runner drives the
//! USART with a tiny built-in firmware that only talks to it through the
//! IO map, the way a program running on the CPU would.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use avrboy_common::{IoMap, IrqLines};
use avrboy_usart::{
    host, Control, Fault, InputEndpoint, OutputEndpoint, Readiness, SharedUsart, Status, Usart,
    UsartConfig,
};
use typed_builder::TypedBuilder;

mod firmware;

pub use firmware::{EchoFirmware, FirmwareMode};

pub const USAGE: &str = "usage: avrboy [echo|echo-irq] [INPUT_PATH|-] [TICKS]";

#[derive(Debug, TypedBuilder)]
pub struct RunConfig {
    #[builder(default = FirmwareMode::Echo)]
    pub firmware: FirmwareMode,
    /// File, FIFO or device to feed the receiver. `None` means stdin.
    #[builder(default)]
    pub input: Option<PathBuf>,
    /// Stop after this many ticks even if input is still open.
    #[builder(default)]
    pub ticks: Option<u64>,
    #[builder(default)]
    pub usart: UsartConfig,
    /// How long to back off when the input has nothing to offer.
    #[builder(default = Duration::from_millis(1))]
    pub idle_sleep: Duration,
}

impl RunConfig {
    /// Parse `[echo|echo-irq] [INPUT_PATH|-] [TICKS]` (program name already
    /// stripped).
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let firmware = match args.next().as_deref() {
            None | Some("echo") => FirmwareMode::Echo,
            Some("echo-irq") | Some("irq") => FirmwareMode::EchoIrq,
            Some(other) => bail!("unknown firmware '{other}'. Supported: echo, echo-irq"),
        };
        let input = args.next().filter(|path| path != "-").map(PathBuf::from);
        let ticks = args
            .next()
            .map(|t| t.parse::<u64>().with_context(|| format!("invalid tick count '{t}'")))
            .transpose()?;
        if let Some(extra) = args.next() {
            bail!("unexpected argument '{extra}'");
        }
        Ok(Self::builder()
            .firmware(firmware)
            .input(input)
            .ticks(ticks)
            .build())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    pub ticks: u64,
    pub echoed: u64,
}

/// The emulated board: an IO map with one USART, the interrupt latch, and
/// the firmware standing in for the CPU.
pub struct Machine {
    io: IoMap,
    irq: IrqLines,
    usart: SharedUsart,
    firmware: EchoFirmware,
    ticks: u64,
}

impl Machine {
    pub fn new(
        config: UsartConfig,
        mode: FirmwareMode,
        input: Box<dyn InputEndpoint>,
        output: Box<dyn OutputEndpoint>,
    ) -> Self {
        let usart = Usart::new(config, input, output).into_shared();
        let mut io = IoMap::new();
        Usart::attach(&usart, &mut io);

        let mut firmware = EchoFirmware::new(mode, config);
        firmware.boot(&mut io);

        Self {
            io,
            irq: IrqLines::new(),
            usart,
            firmware,
            ticks: 0,
        }
    }

    pub fn usart(&self) -> &SharedUsart {
        &self.usart
    }

    /// One emulation tick: poll peripherals, then let the firmware run.
    pub fn step(&mut self) {
        self.io.poll(&mut self.irq);
        self.firmware.step(&mut self.io, &mut self.irq);
        self.ticks += 1;
    }

    /// `true` once the input is exhausted and nothing is left to echo.
    pub fn finished(&self) -> bool {
        let usart = self.usart.borrow();
        usart.input_readiness() == Readiness::Closed && !usart.status().contains(Status::RXC)
    }

    pub fn idle(&self) -> bool {
        self.usart.borrow().input_readiness() == Readiness::Empty
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            ticks: self.ticks,
            echoed: self.firmware.echoed(),
        }
    }

    /// Step until the input is exhausted or `limit` ticks have run.
    pub fn run(&mut self, limit: Option<u64>, idle_sleep: Duration) -> RunStats {
        while limit.map_or(true, |limit| self.ticks < limit) {
            self.step();
            if self.finished() {
                break;
            }
            if self.idle() && !idle_sleep.is_zero() {
                std::thread::sleep(idle_sleep);
            }
        }
        self.stats()
    }
}

pub fn run(config: RunConfig) -> Result<RunStats> {
    let input = match &config.input {
        Some(path) => host::open(path)
            .with_context(|| format!("failed to bind USART input '{}'", path.display()))?,
        None => host::stdin().context("failed to bind USART input to stdin")?,
    };
    log::info!(
        "running {:?} firmware, RXCIE={}",
        config.firmware,
        config.firmware == FirmwareMode::EchoIrq
    );

    let mut machine = Machine::new(
        config.usart,
        config.firmware,
        input,
        Box::new(std::io::stdout()),
    );
    machine
        .usart()
        .borrow_mut()
        .set_fault_hook(Some(Box::new(|fault: &Fault| {
            log::error!("host stream fault: {fault}");
        })));

    let stats = machine.run(config.ticks, config.idle_sleep);
    log::info!(
        "stopped after {} ticks, echoed {} bytes, control={:?}",
        stats.ticks,
        stats.echoed,
        Control::from_bits_retain(machine.usart().borrow().read_control())
    );
    Ok(stats)
}

#[cfg(test)]
mod tests;
