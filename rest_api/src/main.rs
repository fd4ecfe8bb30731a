// rest_api/src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::{info, warn};

use rest_api::config::{jwt_secret, load_config};
use rest_api::{
    ensure_default_admin, open_object_store, register_startup_indexes, start_server, AppState,
};
use storage::{DocumentStore, ObjectStore, SledStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path)?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        data = %config.storage.data_directory,
        "starting dispatch admin API"
    );

    let sled = SledStore::open(&config.storage.data_directory)
        .context("failed to open document store")?;
    let store: Arc<dyn DocumentStore> = Arc::new(sled);
    register_startup_indexes(&store)
        .await
        .context("failed to register startup indexes")?;

    // Bootstrap admin, mirroring first-run setup: only created while the
    // admins collection is empty.
    if let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_BOOTSTRAP_EMAIL"),
        std::env::var("ADMIN_BOOTSTRAP_PASSWORD"),
    ) {
        if ensure_default_admin(&store, &email, &password).await? {
            info!(email = %email, "bootstrap admin provisioned");
        }
    } else {
        warn!("ADMIN_BOOTSTRAP_EMAIL/PASSWORD not set, skipping admin bootstrap");
    }

    let objects = open_object_store(
        &config.storage.object_store_root,
        &config.storage.object_store_base_url,
    )
    .await
    .context("failed to open object store")?;
    let objects: Arc<dyn ObjectStore> = Arc::new(objects);

    let state = AppState::new(store, objects, jwt_secret())
        .await
        .context("failed to build application state")?;

    start_server(config.server, state).await
}
