use danci_review::config::Config;
use danci_review::logging::{init_tracing, FileLogOptions};
use danci_review::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let _log_guard = init_tracing(&config.log_level, FileLogOptions::from_env());

    let addr = config.bind_addr();
    let app = danci_review::app_with_state(AppState::in_memory(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");
    tracing::info!(%addr, "review server listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
