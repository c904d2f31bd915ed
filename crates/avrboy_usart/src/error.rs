use std::io;

use thiserror::Error;

/// Configuration-time failures.
///
/// These surface when a host stream is bound, never from register access or
/// polling: the emulated machine must keep running whatever the host does.
#[derive(Debug, Error)]
pub enum UsartError {
    #[error("unsupported input stream kind: {kind}")]
    UnsupportedInput { kind: &'static str },
    #[error("this host only supports regular files as USART input")]
    UnsupportedPlatform,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A host I/O failure the peripheral absorbed.
///
/// Emulated software still sees the hardware-like outcome (a `0` byte, a
/// dropped transmit, "no data"); the fault is only reported to the log and
/// to an optional diagnostic hook.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Fault {
    #[error("input readiness probe failed: {0}")]
    ProbeFailed(io::ErrorKind),
    #[error("receive read failed, delivered 0x00: {0}")]
    ReadFailed(io::ErrorKind),
    #[error("transmit write dropped: {0}")]
    WriteFailed(io::ErrorKind),
}
