use tokio::net::TcpListener;

use wikipad::{build_router, build_state, Config, Logger, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let config = Config::from_env()?;
    let state = build_state(&config)?;
    let app = build_router(state);

    let addr = config.socket_addr()?;
    log::info!("Wiki listening on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await.map_err(WikiError::from)
}
