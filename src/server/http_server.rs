//! Connection server: a listening socket, one acceptor coroutine, and a
//! fixed-size pool of connection workers.
//!
//! Accepted connections are handed to the pool over an unbounded channel;
//! when every worker is busy, further connections queue rather than being
//! rejected. That queue is a known resource-exhaustion exposure inherited
//! from the wire-compatible design, not an admission-control policy.

use crate::dispatcher::Dispatcher;
use crate::runtime_config::RuntimeConfig;
use crate::server::request::parse_request;
use crate::server::response::write_response;
use may::coroutine::{self, JoinHandle};
use may::net::{TcpListener, TcpStream};
use may::sync::mpsc;
use serde_json::json;
use std::io::{self, BufReader};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The TCP front end owning the listener and the worker pool.
pub struct RestServer {
    dispatcher: Arc<Dispatcher>,
    config: RuntimeConfig,
}

/// Handle to a running server.
///
/// Holds the acceptor coroutine; stopping it drops the connection channel,
/// which drains and retires the workers.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the listener is actually bound to (useful with port 0).
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listener address until it accepts a TCP connection.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server is not reachable within ~250ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if std::net::TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop the acceptor and wait for it to finish.
    pub fn stop(self) {
        // SAFETY: cancel() is marked unsafe by the may runtime. The handle is
        // valid (we own it) and cancellation is the intended shutdown path.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the acceptor coroutine exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the acceptor panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl RestServer {
    /// Build a server with configuration taken from the environment.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_config(dispatcher, RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_config(dispatcher: Dispatcher, config: RuntimeConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }

    /// Bind the listener and start serving.
    ///
    /// The bind happens eagerly on the calling context: failure to bind the
    /// port is the one startup error that aborts entirely. Everything after
    /// this point is contained per-connection.
    ///
    /// # Errors
    ///
    /// Returns the bind error, a spawn error from the coroutine runtime for
    /// the acceptor, or an error if not a single connection worker could be
    /// spawned.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;
        let config = self.config;

        let (tx, rx) = mpsc::channel::<TcpStream>();
        let rx = Arc::new(rx);

        info!(
            addr = %addr,
            workers = config.workers,
            stack_size = config.stack_size,
            "Starting connection workers"
        );

        let mut spawned_workers = 0usize;
        for worker_id in 0..config.workers {
            let rx = Arc::clone(&rx);
            let dispatcher = Arc::clone(&self.dispatcher);
            // SAFETY: coroutine spawn is unsafe in the may runtime. The
            // closure is Send + 'static and owns everything it touches.
            let spawned = unsafe {
                coroutine::Builder::new()
                    .stack_size(config.stack_size)
                    .spawn(move || {
                        debug!(worker_id = worker_id, "Connection worker started");
                        while let Ok(stream) = rx.recv() {
                            if let Err(err) = handle_connection(stream, &dispatcher) {
                                warn!(
                                    worker_id = worker_id,
                                    error = %err,
                                    "Connection failed"
                                );
                            }
                        }
                        debug!(worker_id = worker_id, "Connection worker exiting");
                    })
            };
            match spawned {
                Ok(_) => spawned_workers += 1,
                Err(err) => {
                    error!(worker_id = worker_id, error = %err, "Failed to spawn worker");
                }
            }
        }
        // With zero workers the acceptor would queue connections nobody
        // ever serves, so refuse to start instead.
        if spawned_workers == 0 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "no connection workers could be spawned",
            ));
        }

        // SAFETY: as above; the acceptor owns the listener and the sender.
        let handle = unsafe {
            coroutine::Builder::new()
                .stack_size(config.stack_size)
                .spawn(move || {
                    info!(addr = %addr, "Listening");
                    for stream in listener.incoming() {
                        match stream {
                            Ok(stream) => {
                                if tx.send(stream).is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                error!(error = %err, "Accept failed");
                            }
                        }
                    }
                })
        }?;

        Ok(ServerHandle { addr, handle })
    }
}

/// One unit of work: parse, dispatch, write, close.
///
/// A parse failure still answers the client — a best-effort error JSON body
/// under the fixed 200 header block — so a malformed request never takes the
/// worker down.
fn handle_connection(mut stream: TcpStream, dispatcher: &Dispatcher) -> io::Result<()> {
    let parsed = {
        let mut reader = BufReader::new(&mut stream);
        parse_request(&mut reader)
    };

    let body = match parsed {
        Ok(request) => {
            debug!(action = %request.action(), "Request parsed");
            dispatcher.dispatch(&request)
        }
        Err(err) => {
            warn!(error = %err, "Failed to parse request");
            serde_json::to_vec(&json!({ "error": err.to_string() }))
                .unwrap_or_else(|_| b"null".to_vec())
        }
    };

    write_response(&mut stream, &body)
}
