use async_trait::async_trait;
use domains::ports::CategoryRepository;
use domains::{Category, DomainError, NewCategory, Result};
use sqlx::SqlitePool;

use super::rows::CategoryRow;
use super::{storage_err, unique_or_storage};

const EXISTS: &str = "Category already exists";

pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.map(Category::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description FROM categories WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.map(Category::from))
    }

    async fn create(&self, category: NewCategory) -> Result<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, description) VALUES (?, ?) \
             RETURNING id, name, description",
        )
        .bind(category.name)
        .bind(category.description)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_or_storage(EXISTS))?;
        Ok(row.into())
    }

    async fn update(&self, id: i64, category: NewCategory) -> Result<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories SET name = ?, description = ? WHERE id = ? \
             RETURNING id, name, description",
        )
        .bind(category.name)
        .bind(category.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_or_storage(EXISTS))?;
        row.map(Category::from)
            .ok_or(DomainError::NotFound("Category"))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn ensure(&self, categories: Vec<NewCategory>) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let mut inserted = 0;
        for category in categories {
            inserted += sqlx::query(
                "INSERT INTO categories (name, description) VALUES (?, ?) \
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(category.name)
            .bind(category.description)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?
            .rows_affected();
        }
        tx.commit().await.map_err(storage_err)?;
        Ok(inserted)
    }
}
