//! Bit layouts of the USART status (UCSRnA) and control (UCSRnB) registers.

use bitflags::bitflags;

bitflags! {
    /// UCSRnA bits that the emulator tracks.
    ///
    /// Framing/overrun/parity errors, U2X and MPCM never occur in a model
    /// without line timing, so they are not represented and read as 0.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Status: u8 {
        /// Data register empty. Transmit is unbuffered, so this always reads
        /// back as set.
        const UDRE = 1 << 5;
        /// Transmit complete. Write-1-to-clear.
        const TXC = 1 << 6;
        /// Receive complete. Cleared by reading UDRn.
        const RXC = 1 << 7;
    }
}

bitflags! {
    /// UCSRnB. Every bit is stored and read back verbatim; only `RXCIE`
    /// changes emulated behaviour.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Control: u8 {
        const TXB8 = 1 << 0;
        const RXB8 = 1 << 1;
        const UCSZ2 = 1 << 2;
        const TXEN = 1 << 3;
        const RXEN = 1 << 4;
        const UDRIE = 1 << 5;
        const TXCIE = 1 << 6;
        /// Receive complete interrupt enable.
        const RXCIE = 1 << 7;
    }
}
