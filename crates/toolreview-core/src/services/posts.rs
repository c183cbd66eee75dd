//! Post, comment and like operations with their authorization rules.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Actor, AuthoredComment, Comment, LikeState, Post, PostContent};
use crate::error::{DomainError, missing};
use crate::ports::{ImageError, ImageStore, ImageUpload, PostRepository};

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    images: Arc<dyn ImageStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, images: Arc<dyn ImageStore>) -> Self {
        Self { posts, images }
    }

    /// Create a post. Admin only.
    pub async fn create(
        &self,
        actor: &Actor,
        content: PostContent,
        image: Option<ImageUpload>,
    ) -> Result<Post, DomainError> {
        require_admin(actor)?;
        content.validate()?;

        let image = match image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let post = Post::new(Some(actor.user_id), content, image.clone());
        match self.posts.create(post).await {
            Ok(post) => {
                tracing::info!(post_id = %post.id, sections = post.sections.len(), "Post created");
                Ok(post)
            }
            Err(err) => {
                if let Some(filename) = image {
                    self.discard_image(&filename).await;
                }
                Err(err.into())
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    /// Replace title, summary, tags and sections. Admin only.
    pub async fn edit(
        &self,
        actor: &Actor,
        id: Uuid,
        content: PostContent,
    ) -> Result<Post, DomainError> {
        require_admin(actor)?;
        content.validate()?;

        let mut post = self.get(id).await?;
        post.replace_content(content);

        let post = self.posts.update(post).await.map_err(missing("Post", id))?;
        tracing::info!(post_id = %id, "Post updated");
        Ok(post)
    }

    /// Delete a post together with its comments and likes. Admin only.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        require_admin(actor)?;

        let post = self.get(id).await?;
        self.posts.delete(id).await.map_err(missing("Post", id))?;

        if let Some(filename) = post.image {
            self.discard_image(&filename).await;
        }
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    pub async fn comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        Ok(self.get(post_id).await?.comments)
    }

    pub async fn add_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        text: String,
    ) -> Result<Comment, DomainError> {
        let text = require_text(text)?;
        let comment = Comment::new(text, actor.subject(), actor.email.clone());

        self.posts
            .add_comment(post_id, comment)
            .await
            .map_err(missing("Post", post_id))
    }

    /// Change a comment's text. Author or admin only.
    pub async fn edit_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<Comment, DomainError> {
        let text = require_text(text)?;
        self.authorize_comment(actor, post_id, comment_id).await?;

        self.posts
            .update_comment(post_id, comment_id, text)
            .await
            .map_err(missing("Comment", comment_id))
    }

    /// Remove a comment. Author or admin only.
    pub async fn delete_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        self.authorize_comment(actor, post_id, comment_id).await?;

        self.posts
            .delete_comment(post_id, comment_id)
            .await
            .map_err(missing("Comment", comment_id))
    }

    pub async fn like(&self, actor: &Actor, post_id: Uuid) -> Result<LikeState, DomainError> {
        let likes = self
            .posts
            .add_like(post_id, &actor.subject())
            .await
            .map_err(missing("Post", post_id))?;
        Ok(LikeState { likes, liked: true })
    }

    pub async fn unlike(&self, actor: &Actor, post_id: Uuid) -> Result<LikeState, DomainError> {
        let likes = self
            .posts
            .remove_like(post_id, &actor.subject())
            .await
            .map_err(missing("Post", post_id))?;
        Ok(LikeState {
            likes,
            liked: false,
        })
    }

    pub async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_author(author_id).await?)
    }

    pub async fn comments_by_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<AuthoredComment>, DomainError> {
        Ok(self
            .posts
            .find_comments_by_author(&author_id.to_string())
            .await?)
    }

    async fn authorize_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        let post = self.get(post_id).await?;
        let comment = post
            .comment(comment_id)
            .ok_or_else(|| DomainError::not_found("Comment", comment_id))?;

        if !actor.can_modify(comment) {
            tracing::warn!(
                post_id = %post_id,
                comment_id = %comment_id,
                user_id = %actor.user_id,
                "Comment change refused"
            );
            return Err(DomainError::Forbidden(
                "not comment author or admin".to_string(),
            ));
        }
        Ok(())
    }

    async fn store_image(&self, upload: ImageUpload) -> Result<String, DomainError> {
        if !upload.is_image() {
            let mime = upload
                .content_type
                .unwrap_or_else(|| "unknown type".to_string());
            return Err(ImageError::UnsupportedType(mime).into());
        }
        Ok(self.images.store(upload).await?)
    }

    async fn discard_image(&self, filename: &str) {
        if let Err(err) = self.images.remove(filename).await {
            tracing::warn!(filename, error = %err, "Failed to remove cover image");
        }
    }
}

fn require_admin(actor: &Actor) -> Result<(), DomainError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden("admin role required".to_string()))
    }
}

fn require_text(text: String) -> Result<String, DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::Validation("Comment text is required".to_string()));
    }
    Ok(text)
}
