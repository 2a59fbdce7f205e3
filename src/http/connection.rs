use std::sync::Arc;

use anyhow::Context;
use bytes::BytesMut;
use memchr::memmem;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::http::parser::parse_header_block;
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::router::{self, AppState};

/// Four-byte sequence terminating a request header block.
const HEADER_END: &[u8] = b"\r\n\r\n";

/// Upper bound on a single socket read while assembling a header block.
const READ_CHUNK: usize = 1024;

/// One accepted client connection: the stream, the pending-bytes buffer,
/// and the request-response state machine.
///
/// The connection is owned exclusively by the worker running it; dropping
/// it releases the socket on every exit path.
pub struct Connection {
    stream: TcpStream,
    buffer: BytesMut,
    state: ConnectionState,
    app: Arc<AppState>,
}

enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, app: Arc<AppState>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            app,
        }
    }

    /// Runs the connection to completion: frame, parse, route, write,
    /// repeat until the client disconnects or asks to close.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match self.next_header_block().await? {
                        Some(block) => {
                            let request = parse_header_block(&block);
                            self.state = ConnectionState::Processing(request);
                        }
                        None => {
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(request) => {
                    if request.wants_close() {
                        // the request carrying the close intent is dropped
                        // without an answer
                        self.state = ConnectionState::Closed;
                    } else {
                        let response = router::process(request, &self.app).await;
                        self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                    }
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    // keep-alive: the same connection serves the next
                    // (possibly already-buffered) request
                    self.state = ConnectionState::Reading;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Assembles the next complete header block from the stream.
    ///
    /// The pending buffer is checked for the terminator before any read, so
    /// a request pipelined behind the previous one is returned without
    /// touching the socket. Each returned block runs through the end of the
    /// terminator; every byte after it stays in the buffer for the next
    /// call. A clean end-of-stream before the terminator yields `Ok(None)`
    /// and whatever is pending is discarded with the connection; a read
    /// error likewise ends framing but is surfaced so the caller can log it.
    pub async fn next_header_block(&mut self) -> anyhow::Result<Option<BytesMut>> {
        loop {
            if let Some(pos) = memmem::find(&self.buffer, HEADER_END) {
                let block = self.buffer.split_to(pos + HEADER_END.len());
                return Ok(Some(block));
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self
                .stream
                .read(&mut chunk)
                .await
                .context("read from client failed")?;

            if n == 0 {
                // client closed before completing a header block
                return Ok(None);
            }

            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
