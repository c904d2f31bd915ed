use std::path::PathBuf;
use std::time::Duration;

use avrboy_usart::endpoint::{CaptureOutput, ConsoleEvent, ConsoleInput, MemoryInput};
use avrboy_usart::{Control, UsartConfig};

use super::{FirmwareMode, Machine, RunConfig};

fn args(list: &[&str]) -> impl Iterator<Item = String> {
    list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
}

fn echo_machine(mode: FirmwareMode, input: &[u8]) -> (Machine, CaptureOutput) {
    let out = CaptureOutput::new();
    let machine = Machine::new(
        UsartConfig::default(),
        mode,
        Box::new(MemoryInput::new(input)),
        Box::new(out.clone()),
    );
    (machine, out)
}

#[test]
fn polled_echo_copies_input_to_output() {
    let (mut machine, out) = echo_machine(FirmwareMode::Echo, b"hello, avr\n");
    let stats = machine.run(Some(1_000), Duration::ZERO);

    assert_eq!(out.bytes(), b"hello, avr\n");
    assert_eq!(stats.echoed, 11);
    assert!(machine.finished());
}

#[test]
fn interrupt_echo_copies_input_to_output() {
    let (mut machine, out) = echo_machine(FirmwareMode::EchoIrq, b"irq");
    assert!(
        Control::from_bits_retain(machine.usart().borrow().read_control())
            .contains(Control::RXCIE)
    );

    let stats = machine.run(None, Duration::ZERO);

    assert_eq!(out.bytes(), b"irq");
    assert_eq!(stats.echoed, 3);
}

#[test]
fn polled_firmware_leaves_receive_interrupt_disabled() {
    let (machine, _) = echo_machine(FirmwareMode::Echo, b"");
    let control = Control::from_bits_retain(machine.usart().borrow().read_control());
    assert_eq!(control, Control::RXEN | Control::TXEN);
}

#[test]
fn empty_input_finishes_on_first_tick() {
    let (mut machine, out) = echo_machine(FirmwareMode::Echo, b"");
    let stats = machine.run(None, Duration::ZERO);
    assert_eq!(stats.ticks, 1);
    assert!(out.bytes().is_empty());
}

#[test]
fn open_console_runs_until_tick_limit() {
    let (console, tx) = ConsoleInput::new();
    let out = CaptureOutput::new();
    let mut machine = Machine::new(
        UsartConfig::default(),
        FirmwareMode::EchoIrq,
        Box::new(console),
        Box::new(out.clone()),
    );

    tx.send(ConsoleEvent::Key { down: true, ch: Some(b'k') }).unwrap();
    tx.send(ConsoleEvent::Key { down: false, ch: Some(b'k') }).unwrap();
    let stats = machine.run(Some(50), Duration::ZERO);

    assert_eq!(stats.ticks, 50);
    assert_eq!(out.bytes(), b"k");
    assert!(!machine.finished());
    assert!(machine.idle());

    drop(tx);
    machine.step();
    assert!(machine.finished());
}

#[test]
fn args_default_to_polled_echo_on_stdin() {
    let config = RunConfig::from_args(args(&[])).unwrap();
    assert_eq!(config.firmware, FirmwareMode::Echo);
    assert_eq!(config.input, None);
    assert_eq!(config.ticks, None);
    assert_eq!(config.usart, UsartConfig::default());
}

#[test]
fn args_parse_mode_path_and_ticks() {
    let config = RunConfig::from_args(args(&["echo-irq", "in.txt", "500"])).unwrap();
    assert_eq!(config.firmware, FirmwareMode::EchoIrq);
    assert_eq!(config.input, Some(PathBuf::from("in.txt")));
    assert_eq!(config.ticks, Some(500));

    let config = RunConfig::from_args(args(&["echo", "-"])).unwrap();
    assert_eq!(config.input, None);
}

#[test]
fn args_reject_garbage() {
    assert!(RunConfig::from_args(args(&["chip8"])).is_err());
    assert!(RunConfig::from_args(args(&["echo", "-", "many"])).is_err());
    assert!(RunConfig::from_args(args(&["echo", "-", "1", "extra"])).is_err());
}
