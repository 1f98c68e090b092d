use coursegate_common::{CourseDefinition, database, load_course};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::store::DocumentStore;
use crate::infrastructure::AppStateImpl;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::settings::{Settings, StorageKind};
use crate::infrastructure::store::memory::InMemoryStore;
use crate::infrastructure::store::postgres::PostgresStore;

mod domain;
mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let seed = load_course(&settings.course_seed_path)?;
    tracing::info!(
        chapters = seed.total_chapters(),
        "course seed loaded from {}",
        settings.course_seed_path
    );

    match settings.storage.kind {
        StorageKind::Memory => serve(InMemoryStore::default(), seed, &settings).await,
        StorageKind::Postgres => {
            let database = database::connect(settings.database()?).await?;
            tracing::info!("connected to database");
            serve(PostgresStore::new(database), seed, &settings).await
        }
    }
}

async fn serve<S: DocumentStore>(
    store: S,
    seed: CourseDefinition,
    settings: &Settings,
) -> anyhow::Result<()> {
    let state = AppStateImpl::new(
        store,
        seed,
        &settings.admin.password,
        settings.progress.clear_on_logout,
    );

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
