//! Accounts, authentication and profiles.

use std::sync::Arc;

use domains::ports::{
    AccessToken, MediaStorage, PasswordHasher, TokenService, Upload, UserRepository,
};
use domains::{
    AccountUpdate, Capability, DomainError, NewUser, Page, ProfileUpdate, Result, Role,
    SocialLinks, User,
};
use tracing::{info, warn};

use crate::validation;

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub picture: Option<Upload>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    media: Arc<dyn MediaStorage>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            media,
        }
    }

    pub async fn register(&self, registration: Registration) -> Result<User> {
        let email = validation::email(&registration.email)?;
        let username = validation::username(&registration.username)?;
        validation::password(&registration.password)?;

        let role = registration.role.unwrap_or(Role::User);
        if role == Role::Admin {
            return Err(DomainError::validation("Cannot self-register as admin"));
        }

        self.ensure_available(&email, &username, None).await?;

        let user = self
            .users
            .create(NewUser {
                email,
                username,
                password_hash: self.hasher.hash(&registration.password)?,
                role,
            })
            .await?;
        info!(user_id = user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Password login. Returns a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken> {
        let user = self.check_credentials(email, password).await?;
        self.tokens.issue(&user)
    }

    /// Like [`login`](Self::login), but only for administrators; the response
    /// carries the role for the dashboard.
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AccessToken> {
        let user = self.check_credentials(email, password).await?;
        user.ensure(Capability::Moderate)
            .map_err(|_| DomainError::forbidden("Not authorized. Admin access only."))?;
        let mut token = self.tokens.issue(&user)?;
        token.role = Some(user.role);
        Ok(token)
    }

    /// Resolves a bearer token to the stored, non-banned account.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify(token)?;
        let id = claims
            .user_id()
            .ok_or_else(|| DomainError::unauthorized("Could not validate credentials"))?;
        let user = self
            .users
            .find(id)
            .await?
            .ok_or_else(|| DomainError::unauthorized("Could not validate credentials"))?;
        user.ensure(Capability::Participate)?;
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        self.users
            .find(id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    pub async fn by_username(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    pub async fn list(&self, page: Page) -> Result<Vec<User>> {
        self.users.list(page).await
    }

    pub async fn update_account(
        &self,
        actor: &User,
        id: i64,
        changes: AccountChanges,
    ) -> Result<User> {
        if actor.id != id {
            return Err(DomainError::forbidden("Not authorized to update this user"));
        }
        let email = changes.email.as_deref().map(validation::email).transpose()?;
        let username = changes
            .username
            .as_deref()
            .map(validation::username)
            .transpose()?;
        let password_hash = match changes.password.as_deref() {
            Some(password) => {
                validation::password(password)?;
                Some(self.hasher.hash(password)?)
            }
            None => None,
        };

        let email_changed = email.as_ref().filter(|e| **e != actor.email);
        let username_changed = username.as_ref().filter(|u| **u != actor.username);
        if email_changed.is_some() || username_changed.is_some() {
            self.ensure_available(
                email_changed.map_or("", String::as_str),
                username_changed.map_or("", String::as_str),
                Some(actor.id),
            )
            .await?;
        }

        self.users
            .update_account(
                id,
                AccountUpdate {
                    email,
                    username,
                    password_hash,
                },
            )
            .await
    }

    /// Users may delete their own account; moderators go through
    /// `ModerationService::delete_user` so the deletion is audited.
    pub async fn delete_self(&self, actor: &User, id: i64) -> Result<()> {
        if actor.id != id {
            return Err(DomainError::forbidden("Not authorized to delete this user"));
        }
        if !self.users.delete(id).await? {
            return Err(DomainError::NotFound("User"));
        }
        info!(user_id = id, "account deleted by owner");
        Ok(())
    }

    pub async fn become_artist(&self, actor: &User) -> Result<User> {
        match actor.role {
            Role::Artist => Ok(actor.clone()),
            Role::User => self.users.set_role(actor.id, Role::Artist).await,
            Role::Admin => Err(DomainError::validation("Admins keep the admin role")),
        }
    }

    pub async fn update_profile(&self, actor: &User, changes: ProfileChanges) -> Result<User> {
        let profile_picture = match changes.picture {
            Some(upload) => {
                validation::image(&upload)?;
                Some(self.media.save_image(upload).await?)
            }
            None => None,
        };
        let update = ProfileUpdate {
            bio: changes.bio,
            website: changes.website,
            location: changes.location,
            profile_picture,
            social_links: changes.social_links,
        };
        if update.is_empty() {
            return Ok(actor.clone());
        }
        self.users.update_profile(actor.id, update).await
    }

    async fn check_credentials(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let user = match self.users.find_by_email(&email).await? {
            Some(user) if self.hasher.verify(password, &user.password_hash) => user,
            _ => {
                warn!(%email, "rejected login");
                return Err(DomainError::unauthorized("Incorrect email or password"));
            }
        };
        if user.is_banned() {
            warn!(user_id = user.id, "banned account tried to log in");
            return Err(DomainError::forbidden("Account is banned"));
        }
        Ok(user)
    }

    /// Empty strings skip the corresponding check.
    async fn ensure_available(&self, email: &str, username: &str, except: Option<i64>) -> Result<()> {
        let taken = |user: Option<User>| user.is_some_and(|u| Some(u.id) != except);
        if !email.is_empty() && taken(self.users.find_by_email(email).await?) {
            return Err(DomainError::conflict("Email or username already registered"));
        }
        if !username.is_empty() && taken(self.users.find_by_username(username).await?) {
            return Err(DomainError::conflict("Email or username already registered"));
        }
        Ok(())
    }
}
