//! HTTP server transport.
//!
//! One coroutine runs the accept loop; every accepted connection gets its
//! own coroutine owning its own [`RequestParser`]. A connection serves
//! exactly one request/response pair: the completed request is
//! dispatched, the response written, and the socket closed. Reads and
//! writes suspend only the connection's coroutine, never the reactor
//! thread.

use may::coroutine::{self, JoinHandle};
use may::net::{TcpListener, TcpStream};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::request::{ParseError, RequestParser};
use super::response::serialize_response;
use crate::dispatcher::{DispatchError, Dispatcher, HandlerResponse};

const READ_BUF_SIZE: usize = 4096;

/// HTTP server over a fully built dispatcher.
pub struct HttpServer {
    dispatcher: Arc<Dispatcher>,
}

/// Handle to a running server.
///
/// Lets callers wait until the listener accepts connections, stop the
/// accept loop, or block until it finishes.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl HttpServer {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Bind `addr` and start serving.
    ///
    /// Binding happens before the accept coroutine is spawned so address
    /// errors surface synchronously.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be
    /// bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;
        let dispatcher = self.dispatcher;

        info!(addr = %addr, "Server listening");
        // SAFETY: may::coroutine::spawn() is marked unsafe by the may
        // runtime. The closures are Send + 'static and own everything
        // they touch (listener, stream, Arc'd dispatcher).
        let handle = unsafe {
            coroutine::spawn(move || {
                for stream in listener.incoming() {
                    match stream {
                        Ok(stream) => {
                            let dispatcher = Arc::clone(&dispatcher);
                            unsafe {
                                coroutine::spawn(move || handle_connection(stream, dispatcher));
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            })
        };

        Ok(ServerHandle { addr, handle })
    }
}

impl ServerHandle {
    /// The bound address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to accept connections.
    ///
    /// Polls the bound address with plain TCP connects. Useful in tests
    /// to avoid races between startup and the first request.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not ready within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if std::net::TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop the accept loop and wait for it to finish.
    pub fn stop(self) {
        // SAFETY: cancel() is marked unsafe by the may runtime. The
        // handle is valid and cancellation during shutdown is the
        // intended behavior.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the accept loop exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the accept coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

/// Serve one connection: read until message-complete, dispatch, write the
/// single response, close.
fn handle_connection(mut stream: TcpStream, dispatcher: Arc<Dispatcher>) {
    let peer = stream.peer_addr().ok();
    let mut parser = RequestParser::new();
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => {
                // EOF before message-complete: discard partial state,
                // produce no response.
                debug!(peer = ?peer, "Connection closed before message complete");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                warn!(peer = ?peer, error = %e, "Connection read failed");
                return;
            }
        };

        match parser.feed(&buf[..n]) {
            Ok(None) => {}
            Ok(Some(req)) => {
                let resp = dispatcher.dispatch(req.into());
                write_response(&mut stream, peer, &resp);
                return;
            }
            Err(ParseError::MalformedBody { detail }) => {
                warn!(peer = ?peer, detail = %detail, "Malformed request body");
                let resp = DispatchError::MalformedBody { detail }.to_response();
                write_response(&mut stream, peer, &resp);
                return;
            }
            Err(ParseError::Protocol { detail }) => {
                warn!(peer = ?peer, detail = %detail, "Unparseable request, dropping connection");
                let _ = stream.shutdown(Shutdown::Both);
                return;
            }
        }
    }
}

fn write_response(stream: &mut TcpStream, peer: Option<SocketAddr>, resp: &HandlerResponse) {
    let bytes = serialize_response(resp);
    if let Err(e) = stream.write_all(&bytes) {
        warn!(peer = ?peer, error = %e, "Failed to write response");
    }
    let _ = stream.shutdown(Shutdown::Both);
}
