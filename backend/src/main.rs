use name_picker::{Config, server::{self, AppState}, utils};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let port = config.port;
    let state = AppState::from_config(config).await?;

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    server::serve(listener, state).await
}
