use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use super::Usart;
use crate::endpoint::{CaptureOutput, InputEndpoint, MemoryInput, Readiness};
use crate::registers::{Control, Status};
use crate::{Fault, UsartConfig};

const UDRE: u8 = 1 << 5;
const TXC: u8 = 1 << 6;
const RXC: u8 = 1 << 7;
const RXCIE: u8 = 1 << 7;

fn usart_with_input(bytes: &[u8]) -> (Usart, CaptureOutput) {
    let out = CaptureOutput::new();
    let usart = Usart::new(
        UsartConfig::default(),
        Box::new(MemoryInput::new(bytes)),
        Box::new(out.clone()),
    );
    (usart, out)
}

/// Poll once and return every line the USART requested.
fn poll_lines(usart: &mut Usart) -> Vec<u8> {
    let mut lines = Vec::new();
    usart.poll(&mut |line: u8| lines.push(line));
    lines
}

/// Input that always claims a byte is ready but fails to deliver it.
struct BrokenInput;

impl InputEndpoint for BrokenInput {
    fn probe(&mut self) -> io::Result<Readiness> {
        Ok(Readiness::Ready)
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        Err(io::ErrorKind::BrokenPipe.into())
    }
}

/// Input whose readiness check itself fails.
struct UnprobeableInput;

impl InputEndpoint for UnprobeableInput {
    fn probe(&mut self) -> io::Result<Readiness> {
        Err(io::ErrorKind::PermissionDenied.into())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        unreachable!("read without a successful probe")
    }
}

struct BrokenOutput;

impl Write for BrokenOutput {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn collect_faults(usart: &mut Usart) -> Rc<RefCell<Vec<Fault>>> {
    let faults = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&faults);
    usart.set_fault_hook(Some(Box::new(move |fault: &Fault| {
        sink.borrow_mut().push(*fault)
    })));
    faults
}

#[test]
fn status_always_reports_data_register_empty() {
    let (mut usart, _) = usart_with_input(&[]);
    assert_eq!(usart.read_status(), UDRE);

    for value in 0..=u8::MAX {
        usart.write_status(value);
        assert_ne!(usart.read_status() & UDRE, 0, "after writing {value:#04X}");
    }

    usart.write_data(b'x');
    assert_ne!(usart.read_status() & UDRE, 0);
}

#[test]
fn status_writes_cannot_set_flags() {
    let (mut usart, _) = usart_with_input(&[]);
    usart.write_status(0xFF);
    assert_eq!(usart.read_status(), UDRE);
    assert_eq!(usart.status(), Status::empty());
}

#[test]
fn transmit_complete_is_write_one_to_clear() {
    let (mut usart, _) = usart_with_input(&[]);

    for value in 0..=u8::MAX {
        usart.write_data(0);
        assert_ne!(usart.read_status() & TXC, 0);

        usart.write_status(value);
        let txc_after = usart.read_status() & TXC != 0;
        if value & TXC != 0 {
            assert!(!txc_after, "{value:#04X} should clear TXC");
        } else {
            assert!(txc_after, "{value:#04X} should leave TXC alone");
        }
    }
}

#[test]
fn cleared_transmit_complete_stays_clear_until_next_send() {
    let (mut usart, _) = usart_with_input(&[]);
    usart.write_data(b'a');
    usart.write_status(TXC);
    usart.write_status(0x00);
    usart.write_status(!TXC);
    assert_eq!(usart.read_status() & TXC, 0);

    usart.write_data(b'b');
    assert_ne!(usart.read_status() & TXC, 0);
}

#[test]
fn control_register_reads_back_verbatim() {
    let (mut usart, _) = usart_with_input(&[]);
    assert_eq!(usart.read_control(), 0);

    for value in [0x00, 0x18, 0x98, 0xFF, 0x5A] {
        usart.write_control(value);
        assert_eq!(usart.read_control(), value);
    }
    assert_eq!(usart.control(), Control::from_bits_retain(0x5A));
}

#[test]
fn data_read_without_detected_input_returns_zero_and_consumes_nothing() {
    let (mut usart, _) = usart_with_input(&[0x41]);

    assert_eq!(usart.read_data(), 0);
    assert_eq!(usart.read_status() & RXC, 0);

    // The byte is still there for the poll that eventually notices it.
    assert!(poll_lines(&mut usart).is_empty());
    assert_eq!(usart.read_data(), 0x41);
}

#[test]
fn polled_byte_is_delivered_once() {
    let (mut usart, _) = usart_with_input(&[0x41]);

    poll_lines(&mut usart);
    assert_ne!(usart.read_status() & RXC, 0);

    assert_eq!(usart.read_data(), 0x41);
    assert_eq!(usart.read_status() & RXC, 0);

    assert_eq!(usart.read_data(), 0x00);
}

#[test]
fn receive_interrupt_fires_on_rising_edge_only() {
    let (mut usart, _) = usart_with_input(&[0x42]);
    usart.write_control(RXCIE);

    assert_eq!(poll_lines(&mut usart), vec![19]);
    assert!(poll_lines(&mut usart).is_empty());
    assert!(poll_lines(&mut usart).is_empty());

    assert_eq!(usart.read_data(), 0x42);
}

#[test]
fn receive_interrupt_needs_enable_bit() {
    let (mut usart, _) = usart_with_input(&[0x43]);
    usart.write_control(!RXCIE);

    assert!(poll_lines(&mut usart).is_empty());
    assert_ne!(usart.read_status() & RXC, 0);
}

#[test]
fn enabling_interrupt_after_detection_does_not_fire_retroactively() {
    let (mut usart, _) = usart_with_input(&[0x44, 0x45]);

    poll_lines(&mut usart);
    usart.write_control(RXCIE);
    assert!(poll_lines(&mut usart).is_empty());

    // Next byte produces a fresh edge.
    assert_eq!(usart.read_data(), 0x44);
    assert_eq!(poll_lines(&mut usart), vec![19]);
    assert_eq!(usart.read_data(), 0x45);
}

#[test]
fn interrupt_uses_configured_line() {
    let config = UsartConfig::builder().rx_irq_line(36).build();
    let mut usart = Usart::new(
        config,
        Box::new(MemoryInput::new([1u8])),
        Box::new(CaptureOutput::new()),
    );
    usart.write_control(RXCIE);
    assert_eq!(poll_lines(&mut usart), vec![36]);
}

#[test]
fn repeated_polls_leave_state_unchanged() {
    let (mut usart, _) = usart_with_input(&[0x10, 0x20]);
    usart.write_control(RXCIE);
    poll_lines(&mut usart);
    let snapshot = (usart.read_status(), usart.read_control());

    for _ in 0..16 {
        assert!(poll_lines(&mut usart).is_empty());
        assert_eq!((usart.read_status(), usart.read_control()), snapshot);
    }
    assert_eq!(usart.read_data(), 0x10);
}

#[test]
fn each_detection_matches_one_byte() {
    let input = b"hello";
    let (mut usart, _) = usart_with_input(input);
    let mut received = Vec::new();

    for _ in 0..32 {
        poll_lines(&mut usart);
        if usart.read_status() & RXC != 0 {
            received.push(usart.read_data());
        }
    }

    assert_eq!(received, input);
    assert_eq!(usart.input_readiness(), Readiness::Closed);
}

#[test]
fn exhausted_input_reports_closed_without_raising_rxc() {
    let (mut usart, _) = usart_with_input(&[]);
    usart.write_control(RXCIE);

    assert!(poll_lines(&mut usart).is_empty());
    assert_eq!(usart.input_readiness(), Readiness::Closed);
    assert_eq!(usart.read_status() & RXC, 0);
}

#[test]
fn data_write_forwards_one_byte_per_call() {
    let (mut usart, out) = usart_with_input(&[]);

    usart.write_data(b'O');
    assert_eq!(out.bytes(), b"O");
    assert_eq!(out.write_calls(), 1);

    usart.write_data(b'K');
    usart.write_data(b'K');
    assert_eq!(out.bytes(), b"OKK");
    assert_eq!(out.write_calls(), 3);
}

#[test]
fn failed_read_degrades_to_zero_and_reports_fault() {
    let (mut usart, _) = usart_with_input(&[]);
    usart.set_input(Box::new(BrokenInput));
    let faults = collect_faults(&mut usart);

    poll_lines(&mut usart);
    assert_ne!(usart.read_status() & RXC, 0);

    assert_eq!(usart.read_data(), 0);
    assert_eq!(usart.read_status() & RXC, 0);
    assert_eq!(
        *faults.borrow(),
        vec![Fault::ReadFailed(io::ErrorKind::BrokenPipe)]
    );
}

#[test]
fn failed_write_is_dropped_and_reported() {
    let mut usart = Usart::new(
        UsartConfig::default(),
        Box::new(MemoryInput::default()),
        Box::new(BrokenOutput),
    );
    let faults = collect_faults(&mut usart);

    usart.write_data(b'z');

    assert_ne!(usart.read_status() & TXC, 0);
    assert_eq!(
        *faults.borrow(),
        vec![Fault::WriteFailed(io::ErrorKind::BrokenPipe)]
    );
}

#[test]
fn failed_probe_counts_as_no_data() {
    let mut usart = Usart::new(
        UsartConfig::default(),
        Box::new(UnprobeableInput),
        Box::new(CaptureOutput::new()),
    );
    usart.write_control(RXCIE);
    let faults = collect_faults(&mut usart);

    assert!(poll_lines(&mut usart).is_empty());
    assert_eq!(usart.read_status() & RXC, 0);
    assert_eq!(usart.input_readiness(), Readiness::Empty);
    assert_eq!(
        *faults.borrow(),
        vec![Fault::ProbeFailed(io::ErrorKind::PermissionDenied)]
    );
}

#[test]
fn faults_without_hook_are_still_absorbed() {
    let (mut usart, _) = usart_with_input(&[]);
    usart.set_input(Box::new(BrokenInput));
    poll_lines(&mut usart);
    assert_eq!(usart.read_data(), 0);
}

#[test]
fn replacing_input_redirects_next_read() {
    let (mut usart, _) = usart_with_input(&[0x01]);
    poll_lines(&mut usart);

    usart.set_input(Box::new(MemoryInput::new([0x99u8, 0x98])));
    assert_ne!(usart.read_status() & RXC, 0);
    assert_eq!(usart.read_data(), 0x99);

    poll_lines(&mut usart);
    assert_eq!(usart.read_data(), 0x98);
}

#[test]
fn replacing_output_redirects_next_write() {
    let (mut usart, first) = usart_with_input(&[]);
    usart.write_data(b'1');

    let second = CaptureOutput::new();
    usart.set_output(Box::new(second.clone()));
    usart.write_data(b'2');

    assert_eq!(first.bytes(), b"1");
    assert_eq!(second.bytes(), b"2");
}

#[test]
fn instances_are_independent() {
    let (mut a, _) = usart_with_input(&[0xAA]);
    let (mut b, _) = usart_with_input(&[0xBB]);
    a.write_control(RXCIE);

    assert_eq!(poll_lines(&mut a), vec![19]);
    assert_eq!(b.read_status() & RXC, 0);
    assert_eq!(b.read_control(), 0);

    assert!(poll_lines(&mut b).is_empty());
    assert_eq!(b.read_data(), 0xBB);
    assert_eq!(a.read_data(), 0xAA);
}

#[test]
fn fault_hook_runs_while_usart_is_borrowed() {
    let shared = Usart::new(
        UsartConfig::default(),
        Box::new(BrokenInput),
        Box::new(CaptureOutput::new()),
    )
    .into_shared();
    let borrowed = Rc::new(RefCell::new(Vec::new()));
    let (weak, seen) = (Rc::downgrade(&shared), Rc::clone(&borrowed));
    shared
        .borrow_mut()
        .set_fault_hook(Some(Box::new(move |_: &Fault| {
            if let Some(usart) = weak.upgrade() {
                seen.borrow_mut().push(usart.try_borrow_mut().is_err());
            }
        })));

    shared.borrow_mut().poll(&mut |_: u8| {});
    assert_eq!(shared.borrow_mut().read_data(), 0);
    assert_eq!(*borrowed.borrow(), vec![true]);
}

#[test]
fn frontend_console_can_be_bound_as_input() {
    use crate::endpoint::{ConsoleEvent, ConsoleInput};

    let (mut usart, _) = usart_with_input(&[]);
    let (console, tx) = ConsoleInput::new();
    usart.set_input(Box::new(console));
    usart.write_control(RXCIE);

    assert!(poll_lines(&mut usart).is_empty());
    tx.send(ConsoleEvent::Key { down: true, ch: Some(b'y') }).unwrap();
    assert_eq!(poll_lines(&mut usart), vec![crate::config::USART_RX_IRQ]);
    assert_eq!(usart.read_data(), b'y');
}
