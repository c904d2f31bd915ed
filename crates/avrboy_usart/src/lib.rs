//! USART0 peripheral for the AvrBoy AVR emulator.
//!
//! The peripheral exposes three byte-wide registers (UCSR0A, UCSR0B, UDR0)
//! through an [`avrboy_common::IoRegistry`] and watches a host input stream
//! once per emulation tick. Only the logical flag protocol is modelled;
//! there is no baud-rate or frame timing.

pub mod config;
pub mod endpoint;
mod error;
pub mod registers;
mod usart;

pub use config::UsartConfig;
pub use endpoint::{host, InputEndpoint, OutputEndpoint, Readiness};
pub use error::{Fault, UsartError};
pub use registers::{Control, Status};
pub use usart::{FaultHook, SharedUsart, Usart};
