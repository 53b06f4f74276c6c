#![allow(dead_code)]

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub type AsyncError = Box<dyn std::error::Error + Send + Sync>;

/// What the server saw from the client before it answered.
#[derive(Debug, PartialEq, Eq)]
pub struct ReceivedHandshake {
    pub protocol_version: u32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: u32,
}

/// How the mock server behaves once the handshake and status request have arrived.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Send these bytes, each inner vec as its own write.
    Chunks(Vec<Vec<u8>>),
    /// Send nothing and keep the connection open until the client goes away.
    Silence,
    /// Send these bytes and close the connection straight away.
    Close(Vec<u8>),
}

pub async fn parse_varint<R: AsyncRead + Unpin>(stream: &mut R) -> Result<u32, AsyncError> {
    let mut read_int: u32 = 0;
    for bytes_read in 0..5 {
        let incoming_byte = stream.read_u8().await?;
        read_int |= u32::from(incoming_byte & 0b0111_1111) << (7 * bytes_read);
        if incoming_byte >> 7 == 0 {
            return Ok(read_int);
        }
    }
    Err("VarInt bigger than 5 bytes sent".into())
}

pub fn varint(mut n: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let tmp = n as u8 & 0b0111_1111;
        n >>= 7;
        if n == 0 {
            out.push(tmp);
            return out;
        }
        out.push(tmp | 0b1000_0000);
    }
}

pub fn response_frame(packet_id: u32, json: &str) -> Vec<u8> {
    let mut body = varint(packet_id);
    body.extend(varint(json.len() as u32));
    body.extend_from_slice(json.as_bytes());
    let mut frame = varint(body.len() as u32);
    frame.extend(body);
    frame
}

async fn read_handshake_and_request(
    stream: &mut TcpStream,
) -> Result<ReceivedHandshake, AsyncError> {
    let _length = parse_varint(stream).await?;
    if parse_varint(stream).await? != 0 {
        return Err("handshake with unexpected packet id".into());
    }
    let protocol_version = parse_varint(stream).await?;
    let address_len = parse_varint(stream).await?;
    let mut server_address = String::new();
    (&mut *stream)
        .take(u64::from(address_len))
        .read_to_string(&mut server_address)
        .await?;
    let server_port = stream.read_u16().await?;
    let next_state = parse_varint(stream).await?;

    if parse_varint(stream).await? != 1 || parse_varint(stream).await? != 0 {
        return Err("malformed status request".into());
    }

    Ok(ReceivedHandshake {
        protocol_version,
        server_address,
        server_port,
        next_state,
    })
}

async fn serve_one(mut stream: TcpStream, reply: Reply) -> Result<ReceivedHandshake, AsyncError> {
    let handshake = read_handshake_and_request(&mut stream).await?;
    match reply {
        Reply::Chunks(chunks) => {
            for chunk in chunks {
                stream.write_all(&chunk).await?;
                stream.flush().await?;
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        }
        Reply::Silence => {}
        Reply::Close(bytes) => {
            stream.write_all(&bytes).await?;
            stream.shutdown().await?;
            return Ok(handshake);
        }
    }
    // Wait for the client to close its side.
    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).await?;
    Ok(handshake)
}

/// A listener on an ephemeral local port that serves a single connection.
pub struct MockServer {
    pub addr: SocketAddr,
    pub handle: JoinHandle<Result<ReceivedHandshake, AsyncError>>,
}

impl MockServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await?;
            serve_one(stream, reply).await
        });
        Self { addr, handle }
    }

    pub async fn responding(json: &str) -> Self {
        Self::start(Reply::Chunks(vec![response_frame(0, json)])).await
    }
}
