#![forbid(unsafe_code)]

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let host = std::env::var("XMLCANON_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("XMLCANON_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{host}:{port}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind {addr}: {err}");
            return;
        }
    };

    tracing::info!("listening on {addr}");
    if let Err(err) = axum::serve(listener, xmlcanon_api::app()).await {
        tracing::error!("server error: {err}");
    }
}
