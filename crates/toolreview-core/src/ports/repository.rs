use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AuthoredComment, Comment, NewsletterSignup, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find the user holding an unexpired password reset token.
    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// `update` replaces the editable fields and the cover image only; comments
/// and likes are changed through their dedicated methods.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Every post in store order.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Posts created by `author_id`, newest first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Append a comment. `RepoError::NotFound` if the post is gone.
    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<Comment, RepoError>;

    /// Replace a comment's text. `RepoError::NotFound` if post or comment is gone.
    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<Comment, RepoError>;

    /// Remove a comment. `RepoError::NotFound` if post or comment is gone.
    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), RepoError>;

    /// Comments written by `author` across all posts, newest first.
    async fn find_comments_by_author(
        &self,
        author: &str,
    ) -> Result<Vec<AuthoredComment>, RepoError>;

    /// Atomically add `user_id` to the like set; returns the new set size.
    async fn add_like(&self, post_id: Uuid, user_id: &str) -> Result<usize, RepoError>;

    /// Atomically remove `user_id` from the like set; returns the new set size.
    async fn remove_like(&self, post_id: Uuid, user_id: &str) -> Result<usize, RepoError>;
}

/// Newsletter signup repository.
#[async_trait]
pub trait NewsletterRepository: BaseRepository<NewsletterSignup, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSignup>, RepoError>;

    /// All signups, newest first.
    async fn find_all(&self) -> Result<Vec<NewsletterSignup>, RepoError>;
}
