use std::env;

use anyhow::{Context, anyhow};
use config::{Config, Environment, File};
use coursegate_common::database::DatabaseSettings;
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_port: String,
    pub course_seed_path: String,
    pub admin: AdminSettings,
    #[serde(default)]
    pub progress: ProgressSettings,
    pub storage: StorageSettings,
    pub database: Option<DatabaseSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSettings {
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressSettings {
    #[serde(default)]
    pub clear_on_logout: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub kind: StorageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    Postgres,
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

    /// Database settings, required when the postgres store is selected.
    pub fn database(&self) -> anyhow::Result<&DatabaseSettings> {
        self.database
            .as_ref()
            .ok_or_else(|| anyhow!("storage kind is postgres but no database settings are given"))
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}
