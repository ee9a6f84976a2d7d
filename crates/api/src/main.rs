use std::sync::Arc;

use anyhow::Context;

use inmoadmin_api::config::ServerConfig;
use inmoadmin_api::seed;
use inmoadmin_api::store::CatalogStore;
use inmoadmin_core::TenantId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inmoadmin_observability::init();

    let config = ServerConfig::from_env()?;
    let store = Arc::new(CatalogStore::new());

    match &config.seed_path {
        Some(path) => {
            let tenants = seed::load_seed_file(&store, path)
                .with_context(|| format!("seeding from {}", path.display()))?;
            tracing::info!(path = %path.display(), tenants, "catalog seeded from file");
        }
        None => {
            let tenant_id = config.demo_tenant.unwrap_or_else(TenantId::new);
            store.seed_tenant(tenant_id, seed::demo_catalog())?;
            tracing::info!(%tenant_id, "demo catalog seeded");
        }
    }

    let app = inmoadmin_api::app::build_app(config.jwt_secret, store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
