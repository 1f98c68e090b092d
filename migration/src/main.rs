use coursegate_common::{database, load_course};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    domain::migration::Migration,
    infrastructure::{persistence::PersistenceAdapter, settings::Settings},
};

pub mod domain;
pub mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let seed = load_course(&settings.course_seed_path)?;
    tracing::info!("course seed loaded from {}", settings.course_seed_path);

    let database = database::connect(&settings.database).await?;
    tracing::info!("connected to database");
    let persistence = PersistenceAdapter::new(database);

    // create the document table and seed the course content once
    let migration = Migration::new(seed, persistence);
    migration.migrate().await?;
    tracing::info!("database migrated");

    Ok(())
}
