use std::sync::Arc;

use domains::ports::{
    ArtworkRepository, CategoryRepository, MediaStorage, Upload, UserRepository,
};
use domains::{
    Artist, Artwork, ArtworkFilter, ArtworkPatch, DomainError, NewArtwork, Page, Result, User,
};
use tracing::info;

use crate::validation;

/// Fields of a new artwork as submitted by an artist.
#[derive(Debug, Clone)]
pub struct ArtworkDraft {
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category_id: Option<i64>,
    pub image: Upload,
}

#[derive(Debug, Clone, Default)]
pub struct ArtworkEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Upload>,
}

pub struct ArtworkService {
    artworks: Arc<dyn ArtworkRepository>,
    categories: Arc<dyn CategoryRepository>,
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStorage>,
}

impl ArtworkService {
    pub fn new(
        artworks: Arc<dyn ArtworkRepository>,
        categories: Arc<dyn CategoryRepository>,
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            artworks,
            categories,
            users,
            media,
        }
    }

    pub async fn create(&self, artist: &Artist, draft: ArtworkDraft) -> Result<Artwork> {
        let title = validation::required("Title", &draft.title)?;
        let latitude = validation::coordinate("Latitude", draft.latitude)?;
        let longitude = validation::coordinate("Longitude", draft.longitude)?;
        validation::image(&draft.image)?;

        let category_ids = match draft.category_id {
            Some(id) => {
                self.categories
                    .find(id)
                    .await?
                    .ok_or(DomainError::NotFound("Category"))?;
                vec![id]
            }
            None => Vec::new(),
        };

        let image_url = self.media.save_image(draft.image).await?;
        let artwork = self
            .artworks
            .create(NewArtwork {
                title,
                description: draft.description.trim().to_string(),
                image_url,
                latitude,
                longitude,
                artist_id: artist.id,
                category_ids,
            })
            .await?;
        info!(artwork_id = artwork.id, artist_id = artist.id, "artwork created");
        Ok(artwork)
    }

    /// Hidden artworks are only visible to their owner and to moderators.
    pub async fn get(&self, viewer: &User, id: i64) -> Result<Artwork> {
        let artwork = self.find(id).await?;
        if artwork.is_active() || viewer.ensure_owner_or_admin(artwork.artist_id).is_ok() {
            Ok(artwork)
        } else {
            Err(DomainError::NotFound("Artwork"))
        }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Artwork>> {
        self.artworks.list(ArtworkFilter::active().paged(page)).await
    }

    pub async fn featured(&self, page: Page) -> Result<Vec<Artwork>> {
        let filter = ArtworkFilter {
            featured: Some(true),
            ..ArtworkFilter::active()
        };
        self.artworks.list(filter.paged(page)).await
    }

    pub async fn by_category(&self, category_id: i64, page: Page) -> Result<Vec<Artwork>> {
        self.categories
            .find(category_id)
            .await?
            .ok_or(DomainError::NotFound("Category"))?;
        let filter = ArtworkFilter {
            category_id: Some(category_id),
            ..ArtworkFilter::active()
        };
        self.artworks.list(filter.paged(page)).await
    }

    pub async fn by_artist(&self, username: &str, page: Page) -> Result<Vec<Artwork>> {
        let artist = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(DomainError::NotFound("User"))?;
        let filter = ArtworkFilter {
            artist_id: Some(artist.id),
            ..ArtworkFilter::active()
        };
        self.artworks.list(filter.paged(page)).await
    }

    pub async fn discovered_by(&self, user: &User) -> Result<Vec<Artwork>> {
        let filter = ArtworkFilter {
            discovered_by: Some(user.id),
            ..ArtworkFilter::active()
        };
        self.artworks.list(filter).await
    }

    pub async fn liked_by(&self, user: &User) -> Result<Vec<Artwork>> {
        let filter = ArtworkFilter {
            liked_by: Some(user.id),
            ..ArtworkFilter::active()
        };
        self.artworks.list(filter).await
    }

    pub async fn update(&self, actor: &User, id: i64, edit: ArtworkEdit) -> Result<Artwork> {
        self.owned(actor, id).await?;
        let title = edit
            .title
            .as_deref()
            .map(|t| validation::required("Title", t))
            .transpose()?;
        let image_url = match edit.image {
            Some(upload) => {
                validation::image(&upload)?;
                Some(self.media.save_image(upload).await?)
            }
            None => None,
        };
        let patch = ArtworkPatch {
            title,
            description: edit.description.map(|d| d.trim().to_string()),
            image_url,
        };
        self.artworks.update(id, patch).await
    }

    pub async fn delete(&self, actor: &User, id: i64) -> Result<()> {
        self.owned(actor, id).await?;
        if !self.artworks.delete(id).await? {
            return Err(DomainError::NotFound("Artwork"));
        }
        info!(artwork_id = id, user_id = actor.id, "artwork deleted by owner");
        Ok(())
    }

    /// Returns the artwork with its refreshed category list.
    pub async fn add_categories(
        &self,
        actor: &User,
        id: i64,
        category_ids: Vec<i64>,
    ) -> Result<Artwork> {
        self.owned(actor, id).await?;
        self.artworks.add_categories(id, category_ids).await?;
        self.find(id).await
    }

    async fn find(&self, id: i64) -> Result<Artwork> {
        self.artworks
            .find(id)
            .await?
            .ok_or(DomainError::NotFound("Artwork"))
    }

    async fn owned(&self, actor: &User, id: i64) -> Result<Artwork> {
        actor.ensure(domains::Capability::Participate)?;
        let artwork = self.find(id).await?;
        if artwork.artist_id != actor.id {
            return Err(DomainError::forbidden(
                "Not authorized to modify this artwork",
            ));
        }
        Ok(artwork)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{artwork, user};
    use bytes::Bytes;
    use domains::ports::{
        MockArtworkRepository, MockCategoryRepository, MockMediaStorage, MockUserRepository,
    };
    use domains::{ArtworkStatus, Category, Role};
    use tokio_test::{assert_err, assert_ok};

    struct Mocks {
        artworks: MockArtworkRepository,
        categories: MockCategoryRepository,
        users: MockUserRepository,
        media: MockMediaStorage,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                artworks: MockArtworkRepository::new(),
                categories: MockCategoryRepository::new(),
                users: MockUserRepository::new(),
                media: MockMediaStorage::new(),
            }
        }

        fn service(self) -> ArtworkService {
            ArtworkService::new(
                Arc::new(self.artworks),
                Arc::new(self.categories),
                Arc::new(self.users),
                Arc::new(self.media),
            )
        }
    }

    fn draft(category_id: Option<i64>) -> ArtworkDraft {
        ArtworkDraft {
            title: "  Blue Whale ".into(),
            description: "Harbour wall".into(),
            latitude: 48.85,
            longitude: 2.35,
            category_id,
            image: Upload {
                data: Bytes::from_static(b"png"),
                content_type: mime::IMAGE_PNG,
                file_name: Some("whale.png".into()),
            },
        }
    }

    fn artist(id: i64) -> Artist {
        Artist::try_from(user(id, Role::Artist)).unwrap()
    }

    #[tokio::test]
    async fn create_stores_image_then_artwork() {
        let mut mocks = Mocks::new();
        mocks.categories.expect_find().returning(|id| {
            Ok(Some(Category {
                id,
                name: "Mural".into(),
                description: None,
            }))
        });
        mocks
            .media
            .expect_save_image()
            .times(1)
            .returning(|_| Ok("/uploads/ab/cd/abcd.png".into()));
        mocks
            .artworks
            .expect_create()
            .withf(|new| {
                new.title == "Blue Whale"
                    && new.image_url == "/uploads/ab/cd/abcd.png"
                    && new.category_ids == vec![2]
                    && new.artist_id == 4
            })
            .returning(|new| Ok(artwork(10, new.artist_id, new.latitude, new.longitude)));

        let created = assert_ok!(mocks.service().create(&artist(4), draft(Some(2))).await);
        assert_eq!(created.artist_id, 4);
    }

    #[tokio::test]
    async fn create_with_unknown_category_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.categories.expect_find().returning(|_| Ok(None));
        mocks.media.expect_save_image().never();

        let err = assert_err!(mocks.service().create(&artist(4), draft(Some(99))).await);
        assert!(matches!(err, DomainError::NotFound("Category")));
    }

    #[tokio::test]
    async fn create_rejects_non_image_upload() {
        let mut input = draft(None);
        input.image.content_type = mime::TEXT_PLAIN;
        let err = assert_err!(Mocks::new().service().create(&artist(4), input).await);
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn hidden_artworks_are_invisible_to_strangers() {
        let mut mocks = Mocks::new();
        mocks.artworks.expect_find().returning(|id| {
            let mut hidden = artwork(id, 4, 0.0, 0.0);
            hidden.status = ArtworkStatus::Hidden;
            Ok(Some(hidden))
        });
        let svc = mocks.service();

        let err = assert_err!(svc.get(&user(5, Role::User), 1).await);
        assert!(matches!(err, DomainError::NotFound("Artwork")));
        assert_ok!(svc.get(&user(4, Role::Artist), 1).await);
        assert_ok!(svc.get(&user(1, Role::Admin), 1).await);
    }

    #[tokio::test]
    async fn only_the_owner_may_delete() {
        let mut mocks = Mocks::new();
        mocks
            .artworks
            .expect_find()
            .returning(|id| Ok(Some(artwork(id, 4, 0.0, 0.0))));
        mocks.artworks.expect_delete().never();

        let err = assert_err!(mocks.service().delete(&user(5, Role::Artist), 1).await);
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn featured_listing_filters_active_and_featured() {
        let mut mocks = Mocks::new();
        mocks
            .artworks
            .expect_list()
            .withf(|f| {
                f.featured == Some(true)
                    && f.status == Some(ArtworkStatus::Active)
                    && f.page == Some(Page::new(0, 10))
            })
            .returning(|_| Ok(vec![]));

        assert_ok!(mocks.service().featured(Page::new(0, 10)).await);
    }
}
