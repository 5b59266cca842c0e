use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::{FrameCodec, Request};
use crate::frame::Frame;

/// One client connection: the framed transport plus an id for tracing.
/// Reads decoded requests, writes encoded replies; the socket lifecycle
/// itself belongs to the accept loop that created it.
pub struct Connection {
    pub id: Uuid,
    pub client_address: SocketAddr,
    frames: Framed<TcpStream, FrameCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            client_address,
            frames: Framed::new(stream, FrameCodec),
        }
    }

    /// The next request, or `None` once the peer has hung up.
    pub async fn read_request(&mut self) -> crate::Result<Option<Request>> {
        self.frames.next().await.transpose()
    }

    pub async fn write_frame(&mut self, frame: Frame) -> crate::Result<()> {
        self.frames.send(frame).await
    }
}
