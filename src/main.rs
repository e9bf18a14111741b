use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_api::{
    config::{AppConfig, StoreBackend},
    db::{create_orm_conn, run_migrations},
    repository::{InMemoryStore, SeaOrmStore, ShopStore},
    routes::build_app,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shop_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn ShopStore> = match config.store {
        StoreBackend::Postgres => {
            let orm = create_orm_conn(config.require_database_url()?).await?;
            run_migrations(&orm).await?;
            Arc::new(SeaOrmStore::new(orm))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store, data is lost on shutdown");
            Arc::new(InMemoryStore::new())
        }
    };

    let app = build_app(AppState::new(store, config.auth.clone()));

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
