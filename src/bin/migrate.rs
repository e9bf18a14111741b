use shop_api::{
    config::database_url_from_env,
    db::{create_orm_conn, run_migrations},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let orm = create_orm_conn(&database_url_from_env()?).await?;
    run_migrations(&orm).await?;
    Ok(())
}
