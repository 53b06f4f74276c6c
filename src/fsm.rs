use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::PingError;
use crate::packet::{Handshake, StatusRequest, StatusResponse};
use crate::status::ServerStatus;
use crate::varint::Decoded;
use crate::DEFAULT_PROTOCOL_VERSION;

const READ_CHUNK_LEN: usize = 2048;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    Connecting,
    HandshakeSent,
    AwaitingResponse,
    Complete,
    Failed,
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Complete | State::Failed)
    }
}

#[derive(Debug)]
pub struct Fsm<'a> {
    server_address: &'a str,
    server_port: u16,
    protocol_version: u32,
    state: State,
    received: Vec<u8>,
}

impl<'a> Fsm<'a> {
    pub fn new(server_address: &'a str, server_port: u16) -> Self {
        Self {
            server_address,
            server_port,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            state: State::Connecting,
            received: Vec::new(),
        }
    }

    pub fn protocol_version(self, protocol_version: u32) -> Self {
        Self {
            protocol_version,
            ..self
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn connected(&mut self) -> Vec<u8> {
        let mut outbound = Vec::with_capacity(self.server_address.len() + 16);
        Handshake::status(self.server_address, self.server_port, self.protocol_version)
            .encode(&mut outbound);
        StatusRequest.encode(&mut outbound);
        self.state = State::HandshakeSent;
        outbound
    }

    /// `Ok(None)` until a whole frame is buffered, and for any input after completion.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<ServerStatus>, PingError> {
        match self.state {
            State::Complete | State::Failed => return Ok(None),
            State::Connecting | State::HandshakeSent => self.state = State::AwaitingResponse,
            State::AwaitingResponse => {}
        }
        self.received.extend_from_slice(chunk);

        let decoded = match StatusResponse::try_parse(&self.received) {
            Ok(Decoded::Incomplete) => return Ok(None),
            Ok(Decoded::Complete(response, _)) => ServerStatus::from_json(response.json),
            Err(err) => Err(err),
        };
        self.received = Vec::new();
        match decoded {
            Ok(status) => {
                self.state = State::Complete;
                Ok(Some(status))
            }
            Err(err) => {
                self.state = State::Failed;
                Err(err.into())
            }
        }
    }

    pub async fn run<RW: AsyncRead + AsyncWrite + Unpin>(
        &mut self,
        mut stream: RW,
    ) -> Result<ServerStatus, PingError> {
        let result = self.exchange(&mut stream).await;
        if result.is_err() {
            self.fail();
        }
        let _ = stream.shutdown().await;
        result
    }

    async fn exchange<RW: AsyncRead + AsyncWrite + Unpin>(
        &mut self,
        stream: &mut RW,
    ) -> Result<ServerStatus, PingError> {
        let outbound = self.connected();
        stream.write_all(&outbound).await?;
        stream.flush().await?;
        self.state = State::AwaitingResponse;

        let mut chunk = [0; READ_CHUNK_LEN];
        loop {
            let read = stream.read(&mut chunk).await?;
            if read == 0 {
                return Err(PingError::ConnectionClosed);
            }
            if let Some(status) = self.feed(&chunk[..read])? {
                return Ok(status);
            }
        }
    }

    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = State::Failed;
            self.received = Vec::new();
        }
    }
}
