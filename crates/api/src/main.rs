use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;

use farmhub_infra::store::ensure_schema;
use farmhub_infra::{AppConfig, Repositories, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    farmhub_observability::init();

    let cfg = AppConfig::from_env()?;

    let repos = match &cfg.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to postgres")?;
            ensure_schema(&pool).await.context("failed to prepare schema")?;
            tracing::info!("using postgres storage");
            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data is kept in memory only");
            Repositories::in_memory()
        }
    };

    let services = Arc::new(Services::new(repos, cfg.jwt_secret.as_bytes()));

    if let Some(seed) = &cfg.admin_seed {
        services
            .seed_admin(&seed.login, &seed.password, Utc::now())
            .await
            .context("failed to seed admin user")?;
    }

    let app = farmhub_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
