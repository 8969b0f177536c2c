//! `tiny_http` front end for [`ProxyHandler`].

use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info, warn};
use tiny_http::{Header, Request, Response, Server};

use super::handler::{ProxyHandler, ProxyRequest, ProxyResponse};
use super::upstream::Upstream;
use super::ProxyConfig;
use crate::{Error, Result};

/// A bound proxy server that has not started serving yet
pub struct ProxyServer<U: Upstream + 'static> {
    server: Arc<Server>,
    handler: Arc<ProxyHandler<U>>,
    workers: usize,
}

/// A server running on background threads
pub struct ServerHandle {
    server: Arc<Server>,
    addr: String,
    threads: Vec<JoinHandle<()>>,
}

impl<U: Upstream + 'static> ProxyServer<U> {
    /// Bind to `config.bind`. Use port 0 to let the OS pick one.
    pub fn bind(config: &ProxyConfig, upstream: U) -> Result<Self> {
        if config.workers == 0 {
            return Err(Error::ConfigError("workers must be at least 1".into()));
        }
        let server = Server::http(&config.bind)
            .map_err(|e| Error::ServerError(format!("Failed to bind {}: {}", config.bind, e)))?;
        Ok(Self {
            server: Arc::new(server),
            handler: Arc::new(ProxyHandler::new(upstream, config.max_body_bytes)),
            workers: config.workers,
        })
    }

    /// Address the server is listening on, e.g. `127.0.0.1:3000`
    pub fn local_addr(&self) -> String {
        self.server.server_addr().to_string()
    }

    /// Serve on background threads
    pub fn spawn(self) -> ServerHandle {
        let addr = self.local_addr();
        info!("proxy: listening on {} with {} workers", addr, self.workers);
        let threads = (0..self.workers)
            .map(|_| {
                let server = Arc::clone(&self.server);
                let handler = Arc::clone(&self.handler);
                thread::spawn(move || serve(&server, &handler))
            })
            .collect();
        ServerHandle {
            server: self.server,
            addr,
            threads,
        }
    }

    /// Serve until the process exits
    pub fn run(self) -> Result<()> {
        self.spawn().join()
    }
}

impl ServerHandle {
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Base URL for clients, e.g. `http://127.0.0.1:3000`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting requests and wait for the workers to finish
    pub fn shutdown(self) -> Result<()> {
        for _ in 0..self.threads.len() {
            self.server.unblock();
        }
        self.join()
    }

    fn join(self) -> Result<()> {
        for t in self.threads {
            t.join()
                .map_err(|_| Error::ServerError("worker thread panicked".into()))?;
        }
        info!("proxy: stopped");
        Ok(())
    }
}

fn serve<U: Upstream>(server: &Server, handler: &ProxyHandler<U>) {
    for request in server.incoming_requests() {
        handle_one(request, handler);
    }
}

fn handle_one<U: Upstream>(mut request: Request, handler: &ProxyHandler<U>) {
    let method = request.method().as_str().to_string();
    let path = request.url().to_string();

    // Read one byte past the limit so the handler can tell it was exceeded.
    let mut body = Vec::new();
    let limit = handler.max_body_bytes() as u64 + 1;
    if let Err(e) = request.as_reader().take(limit).read_to_end(&mut body) {
        warn!("proxy: failed to read request body: {}", e);
        body.clear();
    }

    let resp = handler.handle(&ProxyRequest { method, path, body });
    info!("proxy: {} {} -> {}", request.method(), request.url(), resp.status);
    if let Err(e) = request.respond(to_tiny(resp)) {
        error!("proxy: failed to write response: {}", e);
    }
}

fn to_tiny(resp: ProxyResponse) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut out = Response::from_data(resp.body).with_status_code(resp.status);
    for (name, value) in &resp.headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(h) => out.add_header(h),
            Err(()) => warn!("proxy: dropping invalid header {}", name),
        }
    }
    out
}
