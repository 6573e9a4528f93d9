//! The thread-per-connection blocking server (spec §4.1, §5).

use std::io;
use std::net::{TcpListener as StdTcpListener, TcpStream};
use std::sync::Arc;

use socket2::{Domain, Socket, Type};
use tracing::{error, info, info_span};

use crate::codec::MessageType;
use crate::exec::{ConnectionLimiter, Executor};
use crate::transport::{read_frame, write_frame, Header};

/// Implemented once per service by a generated dispatcher that knows how to
/// decode each method's argument struct (which embeds the request-metadata
/// envelope, spec §3) and encode its reply or declared exception.
///
/// `dispatch` never panics across the trait boundary: an unexpected failure
/// should be caught by the implementation and turned into an
/// `ApplicationException` payload with [`MessageType::Exception`].
pub trait RpcService: Send + Sync + 'static {
    /// Name used in startup/shutdown log lines.
    fn name(&self) -> &'static str;

    /// Handles one call's already-framed payload, returning the message type
    /// and payload to write back (a `T_REPLY` struct or a `T_EXCEPTION`
    /// struct — either the service's declared kind or the generic
    /// `ApplicationException`).
    fn dispatch(&self, method: &str, payload: &[u8]) -> (MessageType, Vec<u8>);
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `0` = unlimited: spawn one raw thread per connection with no pool cap.
    pub threads: usize,
    /// `0` = let the OS choose the default backlog.
    pub accept_backlog: u32,
    /// `0` = unlimited simultaneously served clients.
    pub concurrent_client_limit: usize,
}

/// Binds and serves `service` until the process is asked to stop (spec §6:
/// exit code 0 on clean shutdown). Blocks the calling thread.
pub fn serve(config: ServerConfig, service: Arc<dyn RpcService>) -> io::Result<()> {
    let listener = bind(&config)?;
    serve_listener(listener, config.threads, config.concurrent_client_limit, service)
}

/// Binds `config.host:config.port` without starting to accept connections.
/// `port == 0` lets the OS assign an ephemeral port — split out from
/// [`serve`] so callers (tests, mainly) can read the bound port back via
/// `TcpListener::local_addr` before handing the listener to
/// [`serve_listener`].
pub fn bind(config: &ServerConfig) -> io::Result<StdTcpListener> {
    bind_listener(config)
}

/// Accepts and serves connections on an already-bound `listener` until the
/// process is asked to stop. Blocks the calling thread. Factored out of
/// [`serve`] so a listener bound to an OS-assigned port (`bind`) can be
/// served without re-resolving `host:port`.
pub fn serve_listener(
    listener: StdTcpListener,
    threads: usize,
    concurrent_client_limit: usize,
    service: Arc<dyn RpcService>,
) -> io::Result<()> {
    let executor = Executor::new(threads);
    let limiter = ConnectionLimiter::new(concurrent_client_limit);

    info!(
        service = service.name(),
        addr = ?listener.local_addr().ok(),
        threads,
        concurrent_client_limit,
        "server listening"
    );

    for incoming in listener.incoming() {
        let stream = match incoming {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "failed to accept connection");
                continue;
            }
        };
        let permit = limiter.acquire();
        let service = Arc::clone(&service);
        executor.spawn(move || {
            let _permit = permit;
            if let Err(e) = serve_connection(stream, service.as_ref()) {
                error!(error = %e, "connection handling ended with an error");
            }
        });
    }
    Ok(())
}

fn bind_listener(config: &ServerConfig) -> io::Result<StdTcpListener> {
    let addr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{e}")))?;
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr)?;
    let backlog = if config.accept_backlog == 0 {
        1024
    } else {
        config.accept_backlog as i32
    };
    socket.listen(backlog)?;
    socket.set_nonblocking(false)?;
    Ok(socket.into())
}

/// Reads sequential requests from one connection, dispatching and replying
/// on the same stream until the peer closes it. No multiplexing within a
/// connection (spec §4.1).
fn serve_connection(mut stream: TcpStream, service: &dyn RpcService) -> io::Result<()> {
    stream.set_nodelay(true)?;
    loop {
        let (header, payload) = match read_frame(&mut stream)? {
            Some(framed) => framed,
            None => return Ok(()),
        };
        let span = info_span!("rpc_call", method = %header.method_name, seqid = header.seqid);
        let _enter = span.enter();

        if header.message_type != MessageType::Call {
            // A well-behaved client never sends anything but T_CALL.
            continue;
        }
        let (reply_type, reply_payload) = service.dispatch(&header.method_name, &payload);
        let reply_header = Header {
            method_name: header.method_name,
            message_type: reply_type,
            seqid: header.seqid,
        };
        write_frame(&mut stream, &reply_header, &reply_payload)?;
    }
}
