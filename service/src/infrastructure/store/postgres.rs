use coursegate_common::database::Database;
use coursegate_common::{BODY_FIELD_NAME, DocumentKey, KEY_FIELD_NAME, UPDATED_FIELD_NAME};
use serde_json::Value;
use sqlx::Row;
use sqlx::types::Json;

use crate::domain::store::{DocumentStore, Modification, StoreError};

/// Documents kept as JSONB rows of one key/body table, created by the
/// migration binary. `modify` locks the row for the span of a transaction.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    database: &'static Database,
    select_sql: String,
    select_for_update_sql: String,
    upsert_sql: String,
    reserve_sql: String,
    delete_sql: String,
}

impl PostgresStore {
    pub fn new(database: &'static Database) -> Self {
        let table = database.documents_table();
        Self {
            database,
            select_sql: format!(
                "SELECT {BODY_FIELD_NAME} FROM {table} WHERE {KEY_FIELD_NAME} = $1"
            ),
            select_for_update_sql: format!(
                "SELECT {BODY_FIELD_NAME} FROM {table} WHERE {KEY_FIELD_NAME} = $1 FOR UPDATE"
            ),
            upsert_sql: format!(
                "INSERT INTO {table} ({KEY_FIELD_NAME}, {BODY_FIELD_NAME}, {UPDATED_FIELD_NAME}) \
                 VALUES ($1, $2, now()) \
                 ON CONFLICT ({KEY_FIELD_NAME}) DO UPDATE \
                 SET {BODY_FIELD_NAME} = EXCLUDED.{BODY_FIELD_NAME}, {UPDATED_FIELD_NAME} = now()"
            ),
            // gives FOR UPDATE a row to lock when the document does not exist yet
            reserve_sql: format!(
                "INSERT INTO {table} ({KEY_FIELD_NAME}, {BODY_FIELD_NAME}) \
                 VALUES ($1, 'null'::jsonb) ON CONFLICT ({KEY_FIELD_NAME}) DO NOTHING"
            ),
            delete_sql: format!("DELETE FROM {table} WHERE {KEY_FIELD_NAME} = $1"),
        }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn body_of(row: Option<sqlx::postgres::PgRow>) -> Result<Option<Value>, StoreError> {
    let Some(row) = row else {
        return Ok(None);
    };
    let Json(body): Json<Value> = row.try_get(BODY_FIELD_NAME).map_err(backend)?;
    Ok(match body {
        Value::Null => None,
        body => Some(body),
    })
}

impl DocumentStore for PostgresStore {
    async fn get(&self, key: DocumentKey) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query(&self.select_sql)
            .bind(key.as_str())
            .fetch_optional(self.database.database_pool())
            .await
            .map_err(backend)?;
        body_of(row)
    }

    async fn put(&self, key: DocumentKey, value: Value) -> Result<(), StoreError> {
        sqlx::query(&self.upsert_sql)
            .bind(key.as_str())
            .bind(Json(value))
            .execute(self.database.database_pool())
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, key: DocumentKey) -> Result<(), StoreError> {
        sqlx::query(&self.delete_sql)
            .bind(key.as_str())
            .execute(self.database.database_pool())
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn modify<T, E, F>(&self, key: DocumentKey, f: F) -> Result<T, E>
    where
        T: Send,
        E: From<StoreError> + Send,
        F: FnOnce(Option<Value>) -> Result<Modification<T>, E> + Send,
    {
        let mut transaction = self.database.database_pool().begin().await.map_err(backend)?;

        sqlx::query(&self.reserve_sql)
            .bind(key.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(backend)?;

        let row = sqlx::query(&self.select_for_update_sql)
            .bind(key.as_str())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(backend)?;

        // an Err from `f` drops the transaction, which rolls it back
        let result = match f(body_of(row)?)? {
            Modification::Keep(result) => result,
            Modification::Write(value, result) => {
                sqlx::query(&self.upsert_sql)
                    .bind(key.as_str())
                    .bind(Json(value))
                    .execute(&mut *transaction)
                    .await
                    .map_err(backend)?;
                result
            }
        };

        transaction.commit().await.map_err(backend)?;
        Ok(result)
    }
}
