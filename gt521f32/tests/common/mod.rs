//! In-memory fake GT521F32 shared by the integration tests

// Not every test file uses every helper
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use gt521f32::{Command, Device, NackCode, ResponsePacket, Transport, TransportKind};
use gt521f32_core::{CommandPacket, DataPacket, DataPayload, OpenData};
use parking_lot::Mutex;

/// What the fake answers to one command
#[derive(Debug, Clone)]
pub enum Reply {
    Ack(u32),
    Nack(u32),

    /// ACK followed by a data frame
    AckWithData(u32, Bytes),

    /// Fail the write at the transport level
    LinkDown,
}

#[derive(Debug, Default)]
struct State {
    sent: Vec<(Command, u32)>,
    pending: VecDeque<u8>,
    open: bool,
    baud_rates: Vec<u32>,
}

/// Handle for inspecting what a [`FakeSensor`] received
#[derive(Debug, Clone)]
pub struct SensorLog {
    state: Arc<Mutex<State>>,
}

impl SensorLog {
    /// Commands in the order they were sent
    pub fn commands(&self) -> Vec<(Command, u32)> {
        self.state.lock().sent.clone()
    }

    pub fn count(&self, command: Command) -> usize {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|(sent, _)| *sent == command)
            .count()
    }

    /// Parameters of every CMOS_LED command
    pub fn led_commands(&self) -> Vec<u32> {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|(sent, _)| *sent == Command::CmosLed)
            .map(|(_, parameter)| *parameter)
            .collect()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Baud rates the link was reopened at
    pub fn baud_rates(&self) -> Vec<u32> {
        self.state.lock().baud_rates.clone()
    }
}

type Handler = Box<dyn FnMut(Command, u32) -> Reply + Send>;

/// Scripted sensor behind the [`Transport`] trait
pub struct FakeSensor {
    state: Arc<Mutex<State>>,
    handler: Handler,
}

impl FakeSensor {
    pub fn new(handler: impl FnMut(Command, u32) -> Reply + Send + 'static) -> (Self, SensorLog) {
        let state = Arc::new(Mutex::new(State {
            open: true,
            ..State::default()
        }));
        let log = SensorLog {
            state: state.clone(),
        };

        (
            Self {
                state,
                handler: Box::new(handler),
            },
            log,
        )
    }
}

impl Transport for FakeSensor {
    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }

    fn is_open(&self) -> bool {
        self.state.lock().open
    }

    fn write(&mut self, data: &[u8]) -> gt521f32_transport::Result<()> {
        let packet = CommandPacket::decode(data).expect("host sent a malformed frame");
        let command = packet.command().expect("host sent an unknown command");

        self.state.lock().sent.push((command, packet.parameter));

        let mut frames = Vec::new();
        match (self.handler)(command, packet.parameter) {
            Reply::Ack(parameter) => frames.push(ResponsePacket::ack(parameter).encode()),
            Reply::Nack(code) => frames.push(ResponsePacket::nack(code).encode()),
            Reply::AckWithData(parameter, payload) => {
                frames.push(ResponsePacket::ack(parameter).encode());
                frames.push(DataPacket::new(payload).encode());
            }
            Reply::LinkDown => {
                return Err(gt521f32_transport::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "sensor unplugged",
                )));
            }
        }

        let mut state = self.state.lock();
        for frame in frames {
            state.pending.extend(frame.iter().copied());
        }
        Ok(())
    }

    fn read(&mut self, len: usize) -> gt521f32_transport::Result<BytesMut> {
        let mut state = self.state.lock();
        if state.pending.len() < len {
            return Err(gt521f32_transport::Error::ReadTimeout {
                expected: len,
                received: state.pending.len(),
            });
        }

        Ok(state.pending.drain(..len).collect::<Vec<u8>>().as_slice().into())
    }

    fn close(&mut self) -> gt521f32_transport::Result<()> {
        self.state.lock().open = false;
        Ok(())
    }

    fn reopen(&mut self, baud_rate: u32) -> gt521f32_transport::Result<()> {
        let mut state = self.state.lock();
        state.baud_rates.push(baud_rate);
        state.open = true;
        Ok(())
    }

    fn port_name(&self) -> String {
        "/dev/ttyFAKE0".to_string()
    }
}

/// OpenData of the fake: firmware 0x0121, ISO area 400, serial 16 x 0xAB
pub fn open_data() -> OpenData {
    OpenData {
        firmware_version: 0x0121,
        iso_area_max_size: 400,
        serial_number: [0xAB; 16],
    }
}

/// NACK carrying a catalog error
pub fn nack(code: NackCode) -> Reply {
    Reply::Nack(u32::from(u16::from(code)))
}

/// Encoded payload of a data frame
pub fn payload<P: DataPayload>(data: &P) -> Bytes {
    data.to_packet().payload
}

/// A cooperative sensor: finger always pressed, every command accepted
pub fn cooperative(command: Command, _parameter: u32) -> Reply {
    match command {
        Command::Open => Reply::AckWithData(0, payload(&open_data())),
        Command::IsPressFinger => Reply::Ack(0),
        Command::Identify => Reply::Ack(5),
        Command::GetImage => Reply::AckWithData(0, Bytes::from(vec![0x80; 202 * 258])),
        Command::GetRawImage => Reply::AckWithData(0, Bytes::from(vec![0x40; 160 * 120])),
        _ => Reply::Ack(0),
    }
}

/// Device on a fake sensor with a short poll interval
pub fn device(handler: impl FnMut(Command, u32) -> Reply + Send + 'static) -> (Device, SensorLog) {
    let (sensor, log) = FakeSensor::new(handler);
    let device = Device::with_transport(Box::new(sensor)).with_prompt_interval(Duration::from_millis(2));
    (device, log)
}
