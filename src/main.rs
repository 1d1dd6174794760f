use std::net::SocketAddr;
use std::sync::Arc;

use jobtrack_backend::config::{Config, StoreBackend};
use jobtrack_backend::store::memory::{MemJobStore, MemUserStore};
use jobtrack_backend::store::postgres::{create_pool, PgJobStore, PgUserStore};
use jobtrack_backend::store::{JobStore, UserStore};
use jobtrack_backend::{app, AppState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_env()?;

    let (users, jobs): (Arc<dyn UserStore>, Arc<dyn JobStore>) = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = create_pool(&config).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Using postgres store");
            (
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgJobStore::new(pool)),
            )
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is gone when the process exits");
            (Arc::new(MemUserStore::new()), Arc::new(MemJobStore::new()))
        }
    };

    let addr: SocketAddr = config.server_address.parse()?;
    let state = AppState::new(config, users, jobs);
    let router = app(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
