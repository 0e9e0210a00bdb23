use crate::db::DatabasePool;
use crate::error::AppResult;
use crate::models::{City, CreateCityRequest, UpdateCityRequest};
use sqlx::Row;

pub struct CityService {
    db: DatabasePool,
}

impl CityService {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    pub async fn create_city(&self, req: CreateCityRequest) -> AppResult<City> {
        // Save semantics are upsert: posting an existing id replaces its name.
        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query(
                    r#"
                    INSERT INTO cities (id_city, city_name)
                    VALUES ($1, $2)
                    ON CONFLICT (id_city) DO UPDATE SET city_name = EXCLUDED.city_name
                    "#,
                )
                .bind(&req.id_city)
                .bind(&req.city_name)
                .execute(pool)
                .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query(
                    r#"
                    INSERT INTO cities (id_city, city_name)
                    VALUES (?1, ?2)
                    ON CONFLICT (id_city) DO UPDATE SET city_name = excluded.city_name
                    "#,
                )
                .bind(&req.id_city)
                .bind(&req.city_name)
                .execute(pool)
                .await?;
            }
        }

        Ok(City {
            id_city: req.id_city,
            city_name: req.city_name,
        })
    }

    pub async fn get_city(&self, id: &str) -> AppResult<Option<City>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let row = sqlx::query(
                    r#"
                    SELECT id_city, city_name
                    FROM cities
                    WHERE id_city = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|row| self.row_to_city_postgres(row)))
            }
            DatabasePool::Sqlite(pool) => {
                let row = sqlx::query(
                    r#"
                    SELECT id_city, city_name
                    FROM cities
                    WHERE id_city = ?1
                    "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?;

                Ok(row.map(|row| self.row_to_city(row)))
            }
        }
    }

    pub async fn get_all_cities(&self) -> AppResult<Vec<City>> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                let rows = sqlx::query("SELECT id_city, city_name FROM cities ORDER BY id_city")
                    .fetch_all(pool)
                    .await?;

                Ok(rows
                    .into_iter()
                    .map(|row| self.row_to_city_postgres(row))
                    .collect())
            }
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query("SELECT id_city, city_name FROM cities ORDER BY id_city")
                    .fetch_all(pool)
                    .await?;

                Ok(rows.into_iter().map(|row| self.row_to_city(row)).collect())
            }
        }
    }

    pub async fn update_city(&self, id: &str, req: UpdateCityRequest) -> AppResult<Option<City>> {
        if self.get_city(id).await?.is_none() {
            return Ok(None);
        }

        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query("UPDATE cities SET city_name = $2 WHERE id_city = $1")
                    .bind(id)
                    .bind(&req.city_name)
                    .execute(pool)
                    .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query("UPDATE cities SET city_name = ?2 WHERE id_city = ?1")
                    .bind(id)
                    .bind(&req.city_name)
                    .execute(pool)
                    .await?;
            }
        }

        self.get_city(id).await
    }

    // Deleting an absent id is a no-op, matching the store's delete-by-id contract.
    pub async fn delete_city(&self, id: &str) -> AppResult<()> {
        match &self.db {
            DatabasePool::Postgres(pool) => {
                sqlx::query("DELETE FROM cities WHERE id_city = $1")
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query("DELETE FROM cities WHERE id_city = ?1")
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
        }

        Ok(())
    }

    fn row_to_city(&self, row: sqlx::sqlite::SqliteRow) -> City {
        City {
            id_city: row.get("id_city"),
            city_name: row.get("city_name"),
        }
    }

    fn row_to_city_postgres(&self, row: sqlx::postgres::PgRow) -> City {
        City {
            id_city: row.get("id_city"),
            city_name: row.get("city_name"),
        }
    }
}
