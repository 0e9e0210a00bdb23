use crate::db::DatabasePool;
use crate::error::AppResult;
use crate::models::{CreateTransportTypeRequest, TransportType, UpdateTransportTypeRequest};
use sqlx::Row;

pub struct TransportTypeService {
    db: DatabasePool,
}

impl TransportTypeService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    pub async fn create_transport_type(
        &self,
        req: CreateTransportTypeRequest,
    ) -> AppResult<TransportType> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query(
                    r#"
                    INSERT INTO transport_types (id_transport, transport_name)
                    VALUES ($1, $2)
                    ON CONFLICT (id_transport) DO UPDATE SET transport_name = EXCLUDED.transport_name
                    "#,
                )
                .bind(&req.id_transport)
                .bind(&req.transport_name)
                .execute(pool)
                .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query(
                    r#"
                    INSERT INTO transport_types (id_transport, transport_name)
                    VALUES (?1, ?2)
                    ON CONFLICT (id_transport) DO UPDATE SET transport_name = excluded.transport_name
                    "#,
                )
                .bind(&req.id_transport)
                .bind(&req.transport_name)
                .execute(pool)
                .await?;
            }
        }

        Ok(TransportType {
            id_transport: req.id_transport,
            transport_name: req.transport_name,
        })
    }

    pub async fn get_transport_type(&self, id: &str) -> AppResult<Option<TransportType>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let row = sqlx::query(
                    r#"
                    SELECT id_transport, transport_name
                    FROM transport_types
                    WHERE id_transport = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|row| self.row_to_transport_type_postgres(row)))
            }
            DatabasePool::Sqlite(pool) => {
                let row = sqlx::query(
                    r#"
                    SELECT id_transport, transport_name
                    FROM transport_types
                    WHERE id_transport = ?1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|row| self.row_to_transport_type(row)))
            }
        }
    }

    pub async fn get_all_transport_types(&self) -> AppResult<Vec<TransportType>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let rows = sqlx::query(
                    "SELECT id_transport, transport_name FROM transport_types ORDER BY id_transport",
                )
                .fetch_all(pool)
                .await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_transport_type_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query(
                    "SELECT id_transport, transport_name FROM transport_types ORDER BY id_transport",
                )
                .fetch_all(pool)
                .await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_transport_type(row))
                    .collect())
            }
        }
    }

    pub async fn update_transport_type(
        &self,
        id: &str,
        req: UpdateTransportTypeRequest,
    ) -> AppResult<Option<TransportType>> {
        if self.get_transport_type(id).await?.is_none() {
            return Ok(None);
        }

        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query("UPDATE transport_types SET transport_name = $2 WHERE id_transport = $1")
                    .bind(id)
                    .bind(&req.transport_name)
                    .execute(pool)
                    .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query("UPDATE transport_types SET transport_name = ?2 WHERE id_transport = ?1")
                    .bind(id)
                    .bind(&req.transport_name)
                    .execute(pool)
                    .await?;
            }
        }

        self.get_transport_type(id).await
    }

    pub async fn delete_transport_type(&self, id: &str) -> AppResult<()> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query("DELETE FROM transport_types WHERE id_transport = $1")
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query("DELETE FROM transport_types WHERE id_transport = ?1")
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
        }

        Ok(())
    }

    fn row_to_transport_type(&self, row: sqlx::sqlite::SqliteRow) -> TransportType {
        TransportType {
            id_transport: row.get("id_transport"),
            transport_name: row.get("transport_name"),
        }
    }

    fn row_to_transport_type_postgres(&self, row: sqlx::postgres::PgRow) -> TransportType {
        TransportType {
            id_transport: row.get("id_transport"),
            transport_name: row.get("transport_name"),
        }
    }
}
