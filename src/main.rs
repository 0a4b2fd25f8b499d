// Yatube server

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yatube::{app_state::AppState, config::Config, handlers::create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(config.clone()).await?;

    let app = create_router(app_state).layer(CorsLayer::permissive());

    let addr = config.server_address();
    info!("Yatube listening on http://{}", addr);
    info!("Database: {}", config.database.url);
    info!("Media root: {}", config.media.root);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
