use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::PingError;
use crate::fsm::Fsm;
use crate::status::ServerStatus;
use crate::{DEFAULT_PORT, DEFAULT_PROTOCOL_VERSION, DEFAULT_TIMEOUT};

/// Queries one server's status over a fresh TCP connection per call.
#[derive(Debug, Clone)]
pub struct StatusPinger {
    host: String,
    port: u16,
    timeout: Duration,
    protocol_version: u32,
}

impl StatusPinger {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
        }
    }

    pub fn port(self, port: u16) -> Self {
        Self { port, ..self }
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn protocol_version(self, protocol_version: u32) -> Self {
        Self {
            protocol_version,
            ..self
        }
    }

    pub fn target(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    // The timeout covers connect, write and read; dropping the future closes the socket.
    pub async fn query(&self) -> Result<ServerStatus, PingError> {
        let mut fsm = Fsm::new(&self.host, self.port).protocol_version(self.protocol_version);
        match time::timeout(self.timeout, self.connect_and_run(&mut fsm)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                fsm.fail();
                Err(PingError::Timeout {
                    after: self.timeout,
                })
            }
        }
    }

    pub async fn query_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ServerStatus, PingError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PingError::Cancelled),
            result = self.query() => result,
        }
    }

    async fn connect_and_run(&self, fsm: &mut Fsm<'_>) -> Result<ServerStatus, PingError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        stream.set_nodelay(true)?;
        fsm.run(stream).await
    }
}
