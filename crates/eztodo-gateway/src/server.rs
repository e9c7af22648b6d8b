use std::future::Future;
use std::sync::Arc;

use eztodo_config::{AppConfig, ConfigSources};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::{AppState, SharedState};

pub struct GatewayServer {
    state: SharedState,
}

impl GatewayServer {
    pub fn new(config: AppConfig, sources: ConfigSources) -> Self {
        Self::from_state(AppState::new(config, sources))
    }

    pub fn from_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Bind the configured address and serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> std::io::Result<()> {
        let gateway = &self.state.config.gateway;
        let addr = format!("{}:{}", gateway.host, gateway.port);
        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let resolved = self.state.resolve();
        info!(
            %addr,
            provider = %resolved.provider,
            has_credential = resolved.has_credential(),
            "gateway listening"
        );

        let app = build_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
