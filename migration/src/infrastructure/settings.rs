use std::env;

use anyhow::Context;
use config::{Config, Environment, File};
use coursegate_common::database::DatabaseSettings;
use dotenvy::dotenv;
use serde::Deserialize;

/// Subset of the service configuration the migration needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub course_seed_path: String,
    pub database: DatabaseSettings,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let run_mode = load_env("RUN_MODE", "development");

        let s = Config::builder()
            .add_source(File::with_name("./config/default"))
            .add_source(File::with_name(&format!("./config/{run_mode}")).required(false))
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize().with_context(|| "failed to read config")
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}
