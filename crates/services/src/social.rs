use std::sync::Arc;

use domains::ports::{ArtworkRepository, SocialRepository};
use domains::{
    Artwork, Capability, Comment, CommentStatus, DomainError, NewComment, Result, User,
};
use tracing::debug;

use crate::validation;

pub struct SocialService {
    artworks: Arc<dyn ArtworkRepository>,
    social: Arc<dyn SocialRepository>,
}

impl SocialService {
    pub fn new(artworks: Arc<dyn ArtworkRepository>, social: Arc<dyn SocialRepository>) -> Self {
        Self { artworks, social }
    }

    /// Returns `false` when the user had already liked the artwork.
    pub async fn like(&self, user: &User, artwork_id: i64) -> Result<bool> {
        user.ensure(Capability::Participate)?;
        self.active_artwork(artwork_id).await?;
        let created = self.social.like(user.id, artwork_id).await?;
        debug!(user_id = user.id, artwork_id, created, "like");
        Ok(created)
    }

    pub async fn unlike(&self, user: &User, artwork_id: i64) -> Result<()> {
        user.ensure(Capability::Participate)?;
        if self.social.unlike(user.id, artwork_id).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound("Like"))
        }
    }

    pub async fn comment(&self, user: &User, artwork_id: i64, text: &str) -> Result<Comment> {
        user.ensure(Capability::Participate)?;
        let text = validation::required("Comment text", text)?;
        self.active_artwork(artwork_id).await?;
        self.social
            .add_comment(NewComment {
                text,
                user_id: user.id,
                artwork_id,
            })
            .await
    }

    /// Visible comments, oldest first.
    pub async fn comments(&self, artwork_id: i64) -> Result<Vec<Comment>> {
        self.active_artwork(artwork_id).await?;
        self.social
            .comments(artwork_id, Some(CommentStatus::Active))
            .await
    }

    async fn active_artwork(&self, id: i64) -> Result<Artwork> {
        self.artworks
            .find(id)
            .await?
            .filter(Artwork::is_active)
            .ok_or(DomainError::NotFound("Artwork"))
    }
}
