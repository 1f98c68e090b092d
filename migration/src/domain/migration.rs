use std::collections::HashSet;

use anyhow::Context;
use coursegate_common::database::{SqlParameter, Statement, qualified_documents_table};
use coursegate_common::{
    BODY_FIELD_NAME, CourseDefinition, DOCUMENTS_TABLE_NAME, DocumentKey, KEY_FIELD_NAME,
    UPDATED_FIELD_NAME,
};

use crate::domain::persistence::Persistence;

/// One transaction of the migration.
#[derive(Debug, Clone)]
pub enum MigrationStep {
    CreateDocumentsTable { statements: Vec<Statement> },
    SeedCourse { statements: Vec<Statement> },
}

impl MigrationStep {
    fn create_documents_table(database_schema: &str) -> Self {
        let table = qualified_documents_table(database_schema);
        let ddl = format!(
            "CREATE TABLE {table} (\n    \
             \"{KEY_FIELD_NAME}\" TEXT NOT NULL,\n    \
             \"{BODY_FIELD_NAME}\" JSONB NOT NULL,\n    \
             \"{UPDATED_FIELD_NAME}\" TIMESTAMPTZ NOT NULL DEFAULT now(),\n    \
             PRIMARY KEY(\"{KEY_FIELD_NAME}\")\n)"
        );
        Self::CreateDocumentsTable {
            statements: vec![Statement::ddl(ddl)],
        }
    }

    // an existing course document keeps its admin edits
    fn seed_course(database_schema: &str, seed: &CourseDefinition) -> Result<Self, anyhow::Error> {
        let table = qualified_documents_table(database_schema);
        let sql = format!(
            "INSERT INTO {table} (\"{KEY_FIELD_NAME}\", \"{BODY_FIELD_NAME}\") VALUES ($1, $2) \
             ON CONFLICT (\"{KEY_FIELD_NAME}\") DO NOTHING"
        );
        let body = serde_json::to_value(seed).context("failed to encode course seed")?;
        let params = vec![
            SqlParameter::Text(DocumentKey::CourseContent.as_str().to_string()),
            SqlParameter::Json(body),
        ];
        Ok(Self::SeedCourse {
            statements: vec![Statement::with_params(sql, params)],
        })
    }

    pub fn ctx(&self) -> &'static str {
        match self {
            Self::CreateDocumentsTable { .. } => "CREATE TABLE",
            Self::SeedCourse { .. } => "SEED COURSE",
        }
    }

    pub fn into_statements(self) -> Vec<Statement> {
        match self {
            Self::CreateDocumentsTable { statements } | Self::SeedCourse { statements } => {
                statements
            }
        }
    }
}

/// Steps bringing a schema with `existing_tables` up to date.
pub fn migration_steps(
    database_schema: &str,
    existing_tables: &HashSet<String>,
    seed: &CourseDefinition,
) -> Result<Vec<MigrationStep>, anyhow::Error> {
    let mut steps = Vec::new();

    if !existing_tables.contains(DOCUMENTS_TABLE_NAME) {
        steps.push(MigrationStep::create_documents_table(database_schema));
    }
    steps.push(MigrationStep::seed_course(database_schema, seed)?);

    Ok(steps)
}

pub struct Migration<P> {
    seed: CourseDefinition,
    persistence: P,
}

impl<P: Persistence> Migration<P> {
    pub fn new(seed: CourseDefinition, persistence: P) -> Self {
        Self { seed, persistence }
    }

    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        let existing_tables = self.persistence.load().await?;
        let steps = migration_steps(
            self.persistence.database_schema(),
            &existing_tables,
            &self.seed,
        )?;

        tracing::info!(steps = steps.len(), "applying migration");
        self.persistence.apply_migration_steps(steps).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use coursegate_common::test_utils::make_course;

    use super::*;

    #[test]
    fn fresh_schema_creates_and_seeds() {
        let steps = migration_steps("public", &HashSet::new(), &make_course(2)).unwrap();

        assert_eq!(
            steps.iter().map(MigrationStep::ctx).collect::<Vec<_>>(),
            vec!["CREATE TABLE", "SEED COURSE"]
        );

        let statements = steps[0].clone().into_statements();
        let ddl = &statements[0].sql;
        assert!(ddl.starts_with("CREATE TABLE \"public\".\"coursegate_documents\""));
        assert!(ddl.contains("\"body\" JSONB NOT NULL"));
        assert!(ddl.contains("PRIMARY KEY(\"key\")"));
    }

    #[test]
    fn existing_table_is_only_seeded() {
        let existing = HashSet::from([DOCUMENTS_TABLE_NAME.to_string()]);
        let steps = migration_steps("course", &existing, &make_course(1)).unwrap();

        assert_eq!(steps.len(), 1);
        let statement = steps[0].clone().into_statements().remove(0);
        assert!(statement.sql.contains("ON CONFLICT (\"key\") DO NOTHING"));
        assert!(matches!(
            &statement.params[0],
            SqlParameter::Text(key) if key == "courseContent"
        ));
        assert!(matches!(
            &statement.params[1],
            SqlParameter::Json(body) if body["chapters"].as_array().map(Vec::len) == Some(1)
        ));
    }

    #[derive(Clone, Default)]
    struct RecordingPersistence {
        tables: HashSet<String>,
        applied: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Persistence for RecordingPersistence {
        async fn load(&self) -> Result<HashSet<String>, anyhow::Error> {
            Ok(self.tables.clone())
        }

        async fn apply_migration_steps(
            &self,
            steps: Vec<MigrationStep>,
        ) -> Result<(), anyhow::Error> {
            let mut applied = self.applied.lock().unwrap();
            applied.extend(steps.iter().map(MigrationStep::ctx));
            Ok(())
        }

        fn database_schema(&self) -> &str {
            "public"
        }
    }

    #[tokio::test]
    async fn migrate_applies_planned_steps() {
        let persistence = RecordingPersistence::default();
        let migration = Migration::new(make_course(4), persistence.clone());

        migration.migrate().await.unwrap();

        assert_eq!(
            *persistence.applied.lock().unwrap(),
            vec!["CREATE TABLE", "SEED COURSE"]
        );
    }
}
