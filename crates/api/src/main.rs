use std::sync::Arc;

use anyhow::Context;

use wholesale_infra::{AppConfig, BackOffice, BackOfficeStore, InMemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wholesale_observability::init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn BackOfficeStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresStore::connect(
                url,
                config.database_max_connections,
                config.order_tx_timeout,
            )
            .await?;
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    let office = BackOffice::from_config(store, &config);
    if let Some(owner) = office.bootstrap_owner("Owner", "owner").await? {
        tracing::info!(user_id = %owner.id, "send this id as x-user-id to act as the owner");
    }

    let app = wholesale_api::app::build_app(office);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
