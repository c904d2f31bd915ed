use typed_builder::TypedBuilder;

/// UCSR0A data-space address on the ATmega328P.
pub const UCSR0A: u16 = 0xC0;
/// UCSR0B data-space address on the ATmega328P.
pub const UCSR0B: u16 = 0xC1;
/// UDR0 data-space address on the ATmega328P.
pub const UDR0: u16 = 0xC6;
/// USART_RX vector index on the ATmega328P (vector table slot 19).
pub const USART_RX_IRQ: u8 = 19;

/// Where a USART instance lives in the address space and which interrupt
/// line it raises.
///
/// Defaults describe USART0 of the ATmega328P. Parts with several USARTs
/// (ATmega2560 has four) build one config per instance:
///
/// ```
/// use avrboy_usart::UsartConfig;
///
/// let usart1 = UsartConfig::builder()
///     .status_addr(0xC8)
///     .control_addr(0xC9)
///     .data_addr(0xCE)
///     .rx_irq_line(36)
///     .build();
/// assert_eq!(usart1.data_addr, 0xCE);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, TypedBuilder)]
pub struct UsartConfig {
    #[builder(default = UCSR0A)]
    pub status_addr: u16,
    #[builder(default = UCSR0B)]
    pub control_addr: u16,
    #[builder(default = UDR0)]
    pub data_addr: u16,
    /// Line handed to the interrupt requester on a receive-complete edge.
    #[builder(default = USART_RX_IRQ)]
    pub rx_irq_line: u8,
}

impl Default for UsartConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
