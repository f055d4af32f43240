//! Bootstraps a database: an admin account plus the default categories.
//!
//! ```text
//! SEED_ADMIN_EMAIL=admin@example.org SEED_ADMIN_USERNAME=admin \
//! SEED_ADMIN_PASSWORD=change-me-now cargo run -p seed
//! ```
//!
//! An existing account with that email is promoted instead of recreated.

use std::sync::Arc;

use anyhow::{bail, Context};
use auth_adapters::Argon2Hasher;
use configs::Settings;
use domains::ports::{PasswordHasher, UserRepository};
use domains::{NewUser, Role};
use services::{validation, CategoryService};
use storage_adapters::{connect, migrate, SqliteCategoryRepository, SqliteUserRepository};
use tracing::info;

fn required_env(key: &str) -> anyhow::Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{key} must be set"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    artevia::telemetry::init(&settings.log);

    let pool = connect(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.acquire_timeout(),
    )
    .await?;
    migrate(&pool).await?;

    let email = validation::email(&required_env("SEED_ADMIN_EMAIL")?)?;
    let username = validation::username(&required_env("SEED_ADMIN_USERNAME")?)?;
    let password = required_env("SEED_ADMIN_PASSWORD")?;
    validation::password(&password)?;

    let users = SqliteUserRepository::new(pool.clone());
    match users.find_by_email(&email).await? {
        Some(user) if user.role == Role::Admin => {
            info!(user_id = user.id, "admin already present");
        }
        Some(user) => {
            users.set_role(user.id, Role::Admin).await?;
            info!(user_id = user.id, "existing account promoted to admin");
        }
        None => {
            let user = users
                .create(NewUser {
                    email,
                    username,
                    password_hash: Argon2Hasher::new().hash(&password)?,
                    role: Role::Admin,
                })
                .await?;
            info!(user_id = user.id, "admin created");
        }
    }

    let categories = CategoryService::new(Arc::new(SqliteCategoryRepository::new(pool.clone())));
    let seeded = categories.seed_defaults().await?;
    info!(seeded, "default categories ensured");

    pool.close().await;
    Ok(())
}
