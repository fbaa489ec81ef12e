//! Property tests for the slave session

use camino_hal::{Clock, FullDuplex, PinIo, PinMode, SerialLink};
use camino_protocol::{builtin, CommandFrame, Response, ResponseParser};
use camino_slave::{Registry, Slave, SlaveConfig};
use proptest::prelude::*;

const ADDRESS: u8 = 0x21;
const CAPACITY: usize = 64;

#[derive(Default)]
struct Wire {
    sent: Vec<u8>,
    notify: bool,
}

impl SerialLink for Wire {
    fn send_byte(&mut self, byte: u8) {
        self.sent.push(byte);
    }
    fn set_tx_ready_notify(&mut self, enabled: bool) {
        self.notify = enabled;
    }
}

struct Frozen;

impl Clock for Frozen {
    fn now_ms(&self) -> u32 {
        0
    }
}

struct Idle;

impl PinIo for Idle {
    fn pin_mode(&mut self, _pin: u8, _mode: PinMode) {}
    fn digital_write(&mut self, _pin: u8, _high: bool) {}
    fn digital_read(&mut self, _pin: u8) -> bool {
        false
    }
    fn analog_read(&mut self, _pin: u8) -> i16 {
        0
    }
    fn analog_write(&mut self, _pin: u8, _duty: u8) {}
}

type TestSlave = Slave<Wire, Frozen, Idle, FullDuplex, CAPACITY>;

fn slave() -> TestSlave {
    Slave::new(
        SlaveConfig::new(ADDRESS),
        Wire::default(),
        Frozen,
        Idle,
        FullDuplex,
        Registry::new(),
    )
}

fn encode(address: u8, command: u8, payload: &[u8]) -> Vec<u8> {
    CommandFrame::new(address, command, payload)
        .unwrap()
        .encode_to_vec()
        .unwrap()
        .to_vec()
}

/// Feed bytes, draining the transmitter after each one
fn run(slave: &mut TestSlave, bytes: &[u8]) -> Vec<u8> {
    let start = slave.link().sent.len();
    for &b in bytes {
        slave.on_byte_received(b);
        while slave.link().notify {
            slave.on_tx_ready();
        }
    }
    slave.link().sent[start..].to_vec()
}

fn decode_all(bytes: &[u8]) -> Vec<Response> {
    let mut parser = ResponseParser::new();
    let mut out = Vec::new();
    for &b in bytes {
        if let Some(r) = parser.feed(b).unwrap() {
            out.push(r);
        }
    }
    out
}

proptest! {
    #[test]
    fn echo_returns_payload_verbatim(
        payload in proptest::collection::vec(any::<u8>(), 0..=CAPACITY),
    ) {
        let mut slave = slave();
        let sent = run(&mut slave, &encode(ADDRESS, builtin::ECHO, &payload));
        let responses = decode_all(&sent);
        prop_assert_eq!(responses.len(), 1);
        match &responses[0] {
            Response::Data(d) => prop_assert_eq!(d.as_slice(), payload.as_slice()),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn other_addresses_never_get_a_reply(
        address in any::<u8>().prop_filter("not ours", |a| *a != ADDRESS),
        command in 0..builtin::COUNT as u8,
        payload in proptest::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut slave = slave();
        let sent = run(&mut slave, &encode(address, command, &payload));
        prop_assert!(sent.is_empty());
    }

    #[test]
    fn every_corruption_asks_for_resend(
        payload in proptest::collection::vec(any::<u8>(), 1..16),
        index in any::<prop::sample::Index>(),
        delta in 1u8..=255,
    ) {
        let mut slave = slave();
        let mut frame = encode(ADDRESS, builtin::ECHO, &payload);
        // Any byte the checksum covers except the length, which would
        // shift the frame end
        let i = match index.index(payload.len() + 2) {
            0 => 2,
            1 => 3,
            k => 5 + (k - 2),
        };
        frame[i] = frame[i].wrapping_add(delta);
        let sent = run(&mut slave, &frame);
        prop_assert_eq!(sent, vec![0xB8, 0xB8]);
    }

    #[test]
    fn one_reply_per_frame_in_a_burst(
        commands in proptest::collection::vec(0..builtin::COUNT as u8, 1..8),
    ) {
        let mut slave = slave();
        let mut stream = Vec::new();
        for &c in &commands {
            stream.extend(encode(ADDRESS, c, &[0, 0]));
        }
        let sent = run(&mut slave, &stream);
        prop_assert_eq!(decode_all(&sent).len(), commands.len());
    }
}
