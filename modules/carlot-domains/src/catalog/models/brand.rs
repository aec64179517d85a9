use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::slug::slugify;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Stored image file name under the upload directory.
    pub picture: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBrand {
    pub name: String,
    pub slug: String,
    pub picture: String,
}

/// What happened to a rename request.
#[derive(Debug, Clone)]
pub enum BrandRename {
    Renamed(Brand),
    Missing,
    /// Another brand already holds the requested name.
    NameTaken,
}

impl NewBrand {
    pub fn new(name: &str, picture: String) -> Self {
        let name = name.trim().to_string();
        Self {
            slug: slugify(&name),
            name,
            picture,
        }
    }
}

impl Brand {
    /// Insert unless the name is taken. `None` means a brand with this name
    /// already exists; the unique index makes the check atomic.
    pub async fn create(brand: &NewBrand, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO brands (name, slug, picture)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&brand.name)
        .bind(&brand.slug)
        .bind(&brand.picture)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_name(name: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM brands WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM brands WHERE slug = $1 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// First brand (oldest first) whose name matches a case-insensitive
    /// POSIX regex.
    pub async fn find_first_matching(pattern: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM brands WHERE name ~* $1 ORDER BY created_at ASC, id ASC LIMIT 1",
        )
        .bind(pattern)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM brands ORDER BY created_at ASC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Rename in one statement. The unique index on `name` decides races,
    /// so a violation is reported as `NameTaken` rather than an error.
    pub async fn rename(id: Uuid, name: &str, slug: &str, pool: &PgPool) -> Result<BrandRename> {
        let renamed = sqlx::query_as::<_, Self>(
            r#"
            UPDATE brands SET
                name = $2,
                slug = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .fetch_optional(pool)
        .await;

        match renamed {
            Ok(Some(brand)) => Ok(BrandRename::Renamed(brand)),
            Ok(None) => Ok(BrandRename::Missing),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(BrandRename::NameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("DELETE FROM brands WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }
}
