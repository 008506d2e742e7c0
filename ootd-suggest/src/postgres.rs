//! Postgres-backed stores over the `users` and `outfits` tables.

use async_trait::async_trait;
use chrono::NaiveDate;
use ootd_core::{Garment, GarmentId, UserId, UserProfile};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Pool, Postgres, Row};
use tracing::info;

use crate::error::StoreError;
use crate::store::{GarmentStore, ProfileStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(50) NOT NULL,
        email VARCHAR(100) UNIQUE NOT NULL,
        password VARCHAR(200) NOT NULL,
        gender VARCHAR(100),
        dob DATE,
        phone VARCHAR(10),
        profileimageurl VARCHAR(255)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS outfits (
        id SERIAL PRIMARY KEY,
        user_id INT REFERENCES users(id),
        image_url VARCHAR(255) NOT NULL,
        category VARCHAR(50),
        description TEXT,
        tags TEXT,
        subcategory VARCHAR(100)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS outfits_user_id_idx ON outfits (user_id)",
];

const GARMENT_COLUMNS: &str =
    "id::int8 AS id, user_id::int8 AS user_id, image_url, category, subcategory, description, tags";

pub struct PgStore {
    pub pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the tables the pipeline reads, if they are missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("schema ready");
        Ok(())
    }
}

fn garment_from_row(r: &PgRow) -> Result<Garment, sqlx::Error> {
    Ok(Garment {
        id: r.try_get("id")?,
        user_id: r.try_get::<Option<i64>, _>("user_id")?.unwrap_or_default(),
        image_url: r.try_get("image_url")?,
        category: r.try_get("category")?,
        subcategory: r.try_get("subcategory")?,
        description: r.try_get("description")?,
        tags: r.try_get("tags")?,
    })
}

#[async_trait]
impl GarmentStore for PgStore {
    async fn list_garments(&self, user_id: UserId) -> Result<Vec<Garment>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {GARMENT_COLUMNS} FROM outfits WHERE user_id = $1 ORDER BY random()"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(garment_from_row).collect::<Result<_, _>>()?)
    }

    async fn find_garments_by_ids(
        &self,
        user_id: UserId,
        ids: &[GarmentId],
    ) -> Result<Vec<Garment>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {GARMENT_COLUMNS} FROM outfits WHERE user_id = $1 AND id = ANY($2)"
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(garment_from_row).collect::<Result<_, _>>()?)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query("SELECT gender, dob FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(UserProfile {
                gender: r.try_get::<Option<String>, _>("gender")?,
                dob: r.try_get::<Option<NaiveDate>, _>("dob")?,
            })),
            None => Ok(None),
        }
    }
}
