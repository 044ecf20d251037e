//! # Platter Server
//!
//! The marketplace API: `Axum` over an embedded or remote `SurrealDB`, with the
//! feature slices composed by the `platter` facade.
//!
//! ## Example
//! ```no_run
//! use platter_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8080)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

pub use crate::router::app;

use anyhow::{Context, Result};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use platter::domain::config::ApiConfig;
use platter::kernel::security::token::TokenService;
use platter::kernel::server::state::ApiState;
use platter_database::Database;
use platter_event_bus::EventBus;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Collects configuration for a [`Server`].
#[must_use = "call .build().await to get a server"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    async fn connect(&self) -> Result<Database> {
        let store = &self.cfg.database;
        let builder = Database::builder()
            .url(&store.url)
            .session(&store.namespace, &store.database)
            .migrations(platter::migrations());
        let builder = match &store.credentials {
            Some(root) => builder.auth(&root.username, &root.password),
            None => builder,
        };
        builder.init().await.with_context(|| format!("opening database at {}", store.url))
    }

    fn check_tls_files(&self) -> Result<()> {
        let Some(ssl) = &self.cfg.server.ssl else {
            return Ok(());
        };
        for (what, path) in [("certificate", &ssl.cert), ("private key", &ssl.key)] {
            anyhow::ensure!(path.is_file(), "TLS {what} missing: {}", path.display());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = ssl.key.metadata()?.permissions().mode();
            if mode & 0o077 != 0 {
                warn!(key = %ssl.key.display(), mode = format!("{mode:o}"), "TLS key is not private to its owner");
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates SSL files when HTTPS is configured
    /// 2. Connects the database and applies every slice's migrations
    /// 3. Creates the event bus and token service
    /// 4. Initializes the feature slices and folds them into [`ApiState`]
    ///
    /// # Errors
    /// Missing TLS files, an unreachable database or failed migration, an
    /// unusable JWT secret, or a slice that fails to start.
    pub async fn build(self) -> Result<Server> {
        self.check_tls_files()?;
        info!(port = self.cfg.server.port, ssl = self.cfg.server.ssl.is_some(), "Building server");

        let db = self.connect().await?;
        let events = EventBus::new();
        let tokens = TokenService::new(&self.cfg.security.jwt).context("Invalid JWT settings")?;

        let slices = platter::init(&self.cfg, &db, &events, &tokens)
            .await
            .context("starting feature slices")?;

        let state = slices
            .into_iter()
            .fold(
                ApiState::builder().config(self.cfg).db(db).events(events).tokens(tokens),
                |builder, slice| builder.register_slice(slice),
            )
            .build()
            .context("assembling api state")?;
        Ok(Server { state })
    }
}

/// Connected, migrated and wired; [`Server::run`] starts listening.
#[must_use = "call .run().await to serve"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves until Ctrl+C or SIGTERM, then drains connections for the
    /// configured grace period.
    ///
    /// # Errors
    /// Binding the listener or loading the TLS certificates failed.
    pub async fn run(self) -> Result<()> {
        let server = self.state.config.server.clone();
        let address = SocketAddr::new(server.address, server.port);
        let grace = Duration::from_secs(server.shutdown_grace_seconds);
        let app = app(self.state).into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone(), grace));

        match &server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("loading TLS certificate and key")?;
                info!("Serving on https://{address}");
                axum_server::bind_rustls(address, tls)
                    .handle(handle)
                    .serve(app)
                    .await
                    .context("https listener")?;
            }
            None => {
                info!("Serving on http://{address}");
                axum_server::bind(address).handle(handle).serve(app).await.context("http listener")?;
            }
        }

        info!("Server stopped");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

async fn drain_on_signal(handle: Handle<SocketAddr>, grace: Duration) {
    match shutdown_signal().await {
        Ok(()) => {
            info!(grace_seconds = grace.as_secs(), "Draining connections");
            handle.graceful_shutdown(Some(grace));
        }
        Err(e) => error!(error = %e, "Signal listener failed; shutdown only by process kill"),
    }
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let interrupt = async { signal::ctrl_c().await.context("listening for SIGINT") };

    #[cfg(unix)]
    let terminate = async {
        let mut stream = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("listening for SIGTERM")?;
        stream.recv().await;
        Ok::<_, anyhow::Error>(())
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = interrupt => res,
        res = terminate => res,
    }
}
