//! Role-based capabilities.
//!
//! All authorization decisions go through [`User::ensure`]. Services that
//! need a privileged caller take an [`Admin`] or [`Artist`] guard, which can
//! only be obtained through that check.

use std::ops::Deref;

use crate::error::{DomainError, Result};
use crate::models::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any authenticated, non-banned account.
    Participate,
    /// Upload and manage own artworks.
    PublishArtwork,
    /// Everything under `/admin` plus category management.
    Moderate,
}

impl Capability {
    fn granted_to(self, role: Role) -> bool {
        match self {
            Self::Participate => true,
            Self::PublishArtwork => role == Role::Artist,
            Self::Moderate => role == Role::Admin,
        }
    }

    fn denial(self) -> &'static str {
        match self {
            Self::Participate => "Account is not allowed to do this",
            Self::PublishArtwork => "Only artists can create artworks",
            Self::Moderate => "Only admins can access this resource",
        }
    }
}

impl User {
    pub fn can(&self, capability: Capability) -> bool {
        !self.is_banned() && capability.granted_to(self.role)
    }

    pub fn ensure(&self, capability: Capability) -> Result<()> {
        if self.is_banned() {
            return Err(DomainError::forbidden("Account is banned"));
        }
        if !capability.granted_to(self.role) {
            return Err(DomainError::forbidden(capability.denial()));
        }
        Ok(())
    }

    /// Owners and moderators may manage a resource.
    pub fn ensure_owner_or_admin(&self, owner_id: i64) -> Result<()> {
        if self.id == owner_id || self.can(Capability::Moderate) {
            Ok(())
        } else {
            Err(DomainError::forbidden("Not authorized"))
        }
    }
}

macro_rules! role_guard {
    ($name:ident, $capability:expr) => {
        #[doc = concat!("A [`User`] proven to hold `", stringify!($capability), "`.")]
        #[derive(Debug, Clone)]
        pub struct $name(User);

        impl TryFrom<User> for $name {
            type Error = DomainError;

            fn try_from(user: User) -> Result<Self> {
                user.ensure($capability)?;
                Ok(Self(user))
            }
        }

        impl Deref for $name {
            type Target = User;

            fn deref(&self) -> &User {
                &self.0
            }
        }

        impl $name {
            pub fn into_inner(self) -> User {
                self.0
            }
        }
    };
}

role_guard!(Admin, Capability::Moderate);
role_guard!(Artist, Capability::PublishArtwork);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserStatus;
    use chrono::Utc;

    fn user(role: Role, status: UserStatus) -> User {
        User {
            id: 7,
            email: "a@b.c".into(),
            username: "someone".into(),
            password_hash: String::new(),
            role,
            status,
            ban_reason: None,
            bio: None,
            website: None,
            location: None,
            profile_picture: None,
            social_links: Default::default(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn only_admins_moderate() {
        assert!(Admin::try_from(user(Role::Admin, UserStatus::Active)).is_ok());
        let err = Admin::try_from(user(Role::Artist, UserStatus::Active)).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn only_artists_publish() {
        assert!(Artist::try_from(user(Role::Artist, UserStatus::Active)).is_ok());
        assert!(Artist::try_from(user(Role::User, UserStatus::Active)).is_err());
    }

    #[test]
    fn banned_accounts_lose_every_capability() {
        let banned = user(Role::Admin, UserStatus::Banned);
        assert!(!banned.can(Capability::Participate));
        assert!(!banned.can(Capability::Moderate));
        assert!(matches!(
            banned.ensure(Capability::Participate),
            Err(DomainError::Forbidden(msg)) if msg == "Account is banned"
        ));
    }

    #[test]
    fn owners_and_admins_manage_resources() {
        let owner = user(Role::Artist, UserStatus::Active);
        assert!(owner.ensure_owner_or_admin(7).is_ok());
        assert!(owner.ensure_owner_or_admin(8).is_err());
        assert!(user(Role::Admin, UserStatus::Active)
            .ensure_owner_or_admin(8)
            .is_ok());
    }
}
