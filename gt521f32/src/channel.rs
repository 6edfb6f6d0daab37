//! Command round-trips over a borrowed transport

use gt521f32_core::{Command, CommandPacket, DataPacket, DataPayload, ResponsePacket};
use gt521f32_transport::Transport;
use tracing::{debug, trace};

use crate::error::Result;

/// One-command-at-a-time view over a transport
///
/// Sends a command frame and reads the 12-byte response. The response is
/// handed back uninterpreted since its parameter doubles as size, user id
/// or error code depending on the command.
pub struct CommandChannel<'a> {
    transport: &'a mut dyn Transport,
}

impl<'a> CommandChannel<'a> {
    pub fn new(transport: &'a mut dyn Transport) -> Self {
        Self { transport }
    }

    /// Send `command` and wait for its response
    pub fn send(&mut self, command: Command, parameter: u32) -> Result<ResponsePacket> {
        let packet = CommandPacket::new(command, parameter);
        trace!("Sending: {:?}", packet);

        self.transport.write(&packet.encode())?;

        let buf = self.transport.read(ResponsePacket::SIZE)?;
        let response = ResponsePacket::decode(&buf)?;

        debug!(
            "{} ({}) -> {} ({})",
            command,
            parameter,
            if response.is_ack() { "ACK" } else { "NACK" },
            response.parameter
        );

        Ok(response)
    }

    /// Send a command looked up by its catalog name
    ///
    /// Unknown names are rejected before anything reaches the transport.
    pub fn send_named(&mut self, name: &str, parameter: u32) -> Result<ResponsePacket> {
        let command: Command = name.parse()?;
        self.send(command, parameter)
    }

    /// Read the data frame following a response
    pub fn read_data<P: DataPayload>(&mut self) -> Result<P> {
        let buf = self.transport.read(DataPacket::size(P::SIZE))?;
        Ok(P::decode(&buf)?)
    }

    /// Read a data frame whose payload size was announced by the device
    pub fn read_data_sized(&mut self, payload_len: usize) -> Result<DataPacket> {
        let buf = self.transport.read(DataPacket::size(payload_len))?;
        Ok(DataPacket::decode(&buf, payload_len)?)
    }
}
