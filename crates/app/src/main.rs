use std::net::SocketAddr;

use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finance_tracker={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    let db = connect(&server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr: SocketAddr = format!("{}:{}", bind, server.port).parse()?;
    server::run(engine, addr).await;

    Ok(())
}

async fn connect(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = config.url();
    tracing::info!("connecting to {url}");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
