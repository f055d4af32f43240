use std::sync::Arc;

use domains::ports::CategoryRepository;
use domains::{default_categories, Admin, Category, DomainError, NewCategory, Result};
use tracing::info;

use crate::validation;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        self.categories.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Category> {
        self.categories
            .find(id)
            .await?
            .ok_or(DomainError::NotFound("Category"))
    }

    pub async fn create(&self, admin: &Admin, category: NewCategory) -> Result<Category> {
        let category = normalise(category)?;
        if self.categories.find_by_name(&category.name).await?.is_some() {
            return Err(DomainError::conflict("Category already exists"));
        }
        let created = self.categories.create(category).await?;
        info!(category_id = created.id, admin_id = admin.id, "category created");
        Ok(created)
    }

    pub async fn update(&self, admin: &Admin, id: i64, category: NewCategory) -> Result<Category> {
        let category = normalise(category)?;
        self.get(id).await?;
        if let Some(existing) = self.categories.find_by_name(&category.name).await? {
            if existing.id != id {
                return Err(DomainError::conflict("Category already exists"));
            }
        }
        let updated = self.categories.update(id, category).await?;
        info!(category_id = id, admin_id = admin.id, "category updated");
        Ok(updated)
    }

    pub async fn delete(&self, admin: &Admin, id: i64) -> Result<()> {
        if !self.categories.delete(id).await? {
            return Err(DomainError::NotFound("Category"));
        }
        info!(category_id = id, admin_id = admin.id, "category deleted");
        Ok(())
    }

    /// Inserts the default categories that are missing. Safe to run on every
    /// start.
    pub async fn seed_defaults(&self) -> Result<u64> {
        let inserted = self.categories.ensure(default_categories()).await?;
        if inserted > 0 {
            info!(inserted, "default categories seeded");
        }
        Ok(inserted)
    }
}

fn normalise(category: NewCategory) -> Result<NewCategory> {
    Ok(NewCategory {
        name: validation::required("Name", &category.name)?,
        description: category
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    })
}
