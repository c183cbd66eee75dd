use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use toolreview_core::domain::{AuthoredComment, Comment, Post};
use toolreview_core::error::RepoError;
use toolreview_core::ports::{BaseRepository, PostRepository};

/// Posts with their embedded comments and like sets.
///
/// Every mutation happens under one write lock, so concurrent likes from
/// different users never lose each other.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_post<R>(
        &self,
        post_id: Uuid,
        f: impl FnOnce(&mut Post) -> Result<R, RepoError>,
    ) -> Result<R, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or(RepoError::NotFound)?;
        f(post)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("Post already exists".to_string()));
        }
        posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.with_post(post.id, |stored| {
            stored.title = post.title;
            stored.summary = post.summary;
            stored.tags = post.tags;
            stored.sections = post.sections;
            stored.image = post.image;
            stored.updated_at = post.updated_at;
            Ok(stored.clone())
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.posts.read().await.clone())
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let mut found: Vec<Post> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.author_id == Some(author_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found)
    }

    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<Comment, RepoError> {
        self.with_post(post_id, |post| {
            post.comments.push(comment.clone());
            Ok(comment)
        })
        .await
    }

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<Comment, RepoError> {
        self.with_post(post_id, |post| {
            let comment = post
                .comments
                .iter_mut()
                .find(|c| c.id == comment_id)
                .ok_or(RepoError::NotFound)?;
            comment.text = text;
            Ok(comment.clone())
        })
        .await
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), RepoError> {
        self.with_post(post_id, |post| {
            let before = post.comments.len();
            post.comments.retain(|c| c.id != comment_id);
            if post.comments.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn find_comments_by_author(
        &self,
        author: &str,
    ) -> Result<Vec<AuthoredComment>, RepoError> {
        let posts = self.posts.read().await;
        let mut found: Vec<AuthoredComment> = posts
            .iter()
            .flat_map(|post| {
                post.comments
                    .iter()
                    .filter(|c| c.author == author)
                    .map(|c| AuthoredComment {
                        comment: c.clone(),
                        post_id: post.id,
                        post_title: post.title.clone(),
                    })
            })
            .collect();
        found.sort_by(|a, b| b.comment.date.cmp(&a.comment.date));
        Ok(found)
    }

    async fn add_like(&self, post_id: Uuid, user_id: &str) -> Result<usize, RepoError> {
        self.with_post(post_id, |post| {
            if post.likes.insert(user_id.to_string()) {
                post.updated_at = Utc::now();
            }
            Ok(post.like_count())
        })
        .await
    }

    async fn remove_like(&self, post_id: Uuid, user_id: &str) -> Result<usize, RepoError> {
        self.with_post(post_id, |post| {
            if post.likes.remove(user_id) {
                post.updated_at = Utc::now();
            }
            Ok(post.like_count())
        })
        .await
    }
}
