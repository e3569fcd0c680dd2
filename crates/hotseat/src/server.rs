//! `HotseatServer` builder and accept loop.
//!
//! This is the entry point for running a Hotseat quiz server. It ties
//! together all the layers: transport → protocol → router → game.

use std::sync::Arc;

use hotseat_protocol::{Codec, JsonCodec};
use hotseat_store::{QuizCatalog, SessionStore};
use hotseat_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::router::EventRouter;
use crate::HotseatError;

/// Builder for configuring and starting a Hotseat server.
///
/// The builder is deliberately non-generic: the server's type
/// parameters are fixed only when [`build`](Self::build) receives the
/// catalog and store, so call sites never spell them out.
///
/// # Example
///
/// ```rust,ignore
/// use hotseat::prelude::*;
///
/// let server = HotseatServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(catalog, store)
///     .await?;
/// server.run().await
/// ```
pub struct HotseatServerBuilder {
    bind_addr: String,
}

impl HotseatServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Builds and starts the server with the given catalog and store.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` — the wire format the
    /// browser clients speak.
    pub async fn build<C: QuizCatalog, S: SessionStore>(
        self,
        catalog: C,
        store: S,
    ) -> Result<HotseatServer<C, S, JsonCodec>, HotseatError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        Ok(HotseatServer {
            transport,
            router: Arc::new(EventRouter::new(catalog, Arc::new(store))),
            codec: JsonCodec,
        })
    }
}

impl Default for HotseatServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Hotseat quiz server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HotseatServer<C: QuizCatalog, S: SessionStore, K: Codec> {
    transport: WebSocketTransport,
    router: Arc<EventRouter<C, S>>,
    codec: K,
}

impl<C, S, K> HotseatServer<C, S, K>
where
    C: QuizCatalog,
    S: SessionStore,
    K: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// one. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), HotseatError> {
        tracing::info!("Hotseat server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let router = Arc::clone(&self.router);
                    let codec = self.codec.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, router, codec).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
