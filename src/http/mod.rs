//! The HTTP server, handler and routes.
//!
//! This file itself contains fairly little business logic and just sets up the
//! `hyper` server and catches errors. The main logic is in `handlers.rs`.

use bytes::Bytes;
use futures::FutureExt;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use std::{
    convert::Infallible,
    future::Future,
    net::{IpAddr, SocketAddr},
    panic::AssertUnwindSafe,
    sync::Arc,
};
use tokio::net::TcpListener;

use crate::{config::Config, prelude::*, store::Store};
use self::{handlers::handle, response::internal_server_error};


mod handlers;
mod response;



/// HTTP server configuration.
#[derive(Debug, Clone, confique::Config)]
pub struct HttpConfig {
    /// The TCP port the HTTP server should listen on.
    #[config(default = 3090)]
    pub port: u16,

    /// The bind address to listen on.
    #[config(default = "127.0.0.1")]
    pub address: IpAddr,
}


// All our responses have the complete body in memory.
type Response<T = Full<Bytes>> = hyper::Response<T>;
type Request<T = hyper::body::Incoming> = hyper::Request<T>;


/// Context that the request handler has access to.
struct Context {
    store: Arc<dyn Store>,
    config: Config,
}


/// Starts the HTTP server and runs it until Ctrl+C is received.
pub async fn serve(config: Config, store: Arc<dyn Store>) -> Result<()> {
    let addr = SocketAddr::new(config.http.address, config.http.port);
    let ctx = Arc::new(Context { store, config });

    let listener = TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(v) => v,
                Err(e) => {
                    warn!("Failed to accept connection: {e}");
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down HTTP server");
                return Ok(());
            }
        };

        // Each connection gets its own task. The service closure is called
        // for every request on that connection.
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let service = service_fn(move |req: Request| {
                handle_internal_errors(handle(req, Arc::clone(&ctx)))
            });

            let result = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await;
            if let Err(e) = result {
                debug!("Error while serving connection from {peer}: {e}");
            }
        });
    }
}

/// This just wraps another future and catches all panics that might occur when
/// resolving/polling that given future. This ensures that we always answer with
/// `500` instead of just crashing the task and closing the connection.
async fn handle_internal_errors(
    future: impl Future<Output = Response>,
) -> Result<Response, Infallible> {
    // The `AssertUnwindSafe` is fine: handlers share nothing but the store,
    // which stays usable after a panic in one request.
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(response) => Ok(response),
        Err(panic) => {
            // For most panics (which use `panic!` like `println!`), the payload
            // is either `&str` or `String`.
            let msg = panic.downcast_ref::<String>()
                .map(|s| s.as_str())
                .or(panic.downcast_ref::<&str>().map(|s| *s));

            match msg {
                Some(msg) => error!("INTERNAL SERVER ERROR: HTTP handler panicked: '{}'", msg),
                None => error!("INTERNAL SERVER ERROR: HTTP handler panicked"),
            }

            Ok(internal_server_error())
        }
    }
}
