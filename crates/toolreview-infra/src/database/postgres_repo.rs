//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use toolreview_core::domain::email::mask_email;
use toolreview_core::domain::{AuthoredComment, Comment, NewsletterSignup, Post, Section, User};
use toolreview_core::error::RepoError;
use toolreview_core::ports::{BaseRepository, NewsletterRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::entity::newsletter::{self, Entity as NewsletterEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, db_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL newsletter signup repository.
pub type PostgresNewsletterRepository = PostgresBaseRepository<NewsletterEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::ResetToken.eq(token))
            .filter(user::Column::ResetExpires.gt(now))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl NewsletterRepository for PostgresNewsletterRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSignup>, RepoError> {
        let result = NewsletterEntity::find()
            .filter(newsletter::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<NewsletterSignup>, RepoError> {
        let result = NewsletterEntity::find()
            .order_by_desc(newsletter::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL post repository.
///
/// A post is spread over three tables, so it does not fit
/// [`PostgresBaseRepository`]: rows are assembled here.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }

    async fn require_post<C: ConnectionTrait>(db: &C, post_id: Uuid) -> Result<(), RepoError> {
        PostEntity::find_by_id(post_id)
            .one(db)
            .await
            .map_err(db_error)?
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn like_count<C: ConnectionTrait>(db: &C, post_id: Uuid) -> Result<usize, RepoError> {
        let count = LikeEntity::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(db)
            .await
            .map_err(db_error)?;
        Ok(count as usize)
    }

    /// Attach comments and likes to a batch of post rows, preserving order.
    async fn assemble(&self, rows: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

        let mut comments: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for row in CommentEntity::find()
            .filter(comment::Column::PostId.is_in(ids.clone()))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?
        {
            comments.entry(row.post_id).or_default().push(row.into());
        }

        let mut likes: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in LikeEntity::find()
            .filter(like::Column::PostId.is_in(ids))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?
        {
            likes.entry(row.post_id).or_default().push(row.user_id);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                to_post(
                    row,
                    comments.remove(&id).unwrap_or_default(),
                    likes.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }
}

fn to_post(
    row: post::Model,
    comments: Vec<Comment>,
    likes: Vec<String>,
) -> Result<Post, RepoError> {
    let tags: Vec<String> =
        serde_json::from_value(row.tags).map_err(|e| RepoError::Query(e.to_string()))?;
    let sections: Vec<Section> =
        serde_json::from_value(row.sections).map_err(|e| RepoError::Query(e.to_string()))?;

    Ok(Post {
        id: row.id,
        author_id: row.author_id,
        title: row.title,
        summary: row.summary,
        tags,
        image: row.image,
        sections,
        comments,
        likes: likes.into_iter().collect(),
        date: row.created_at.into(),
        updated_at: row.updated_at.into(),
    })
}

/// Columns owned by the post row itself. Comments and likes are excluded.
fn to_active_model(post: &Post) -> Result<post::ActiveModel, RepoError> {
    let encode = |e: serde_json::Error| RepoError::Query(e.to_string());
    Ok(post::ActiveModel {
        id: Set(post.id),
        author_id: Set(post.author_id),
        title: Set(post.title.clone()),
        summary: Set(post.summary.clone()),
        tags: Set(serde_json::to_value(&post.tags).map_err(encode)?),
        sections: Set(serde_json::to_value(&post.sections).map_err(encode)?),
        image: Set(post.image.clone()),
        created_at: Set(post.date.into()),
        updated_at: Set(post.updated_at.into()),
    })
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(row) = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };

        Ok(self.assemble(vec![row]).await?.pop())
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        to_active_model(&post)?.insert(&txn).await.map_err(db_error)?;
        for comment in post.comments.iter().cloned() {
            comment::ActiveModel::from_comment(post.id, comment)
                .insert(&txn)
                .await
                .map_err(db_error)?;
        }
        for user_id in &post.likes {
            like::ActiveModel {
                post_id: Set(post.id),
                user_id: Set(user_id.clone()),
                created_at: Set(post.date.into()),
            }
            .insert(&txn)
            .await
            .map_err(db_error)?;
        }

        txn.commit().await.map_err(db_error)?;
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut active = to_active_model(&post)?;
        active.author_id = NotSet;
        active.created_at = NotSet;
        active.update(self.db.as_ref()).await.map_err(db_error)?;

        self.find_by_id(post.id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        LikeEntity::delete_many()
            .filter(like::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        let result = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        txn.commit().await.map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_asc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        self.assemble(rows).await
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        self.assemble(rows).await
    }

    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<Comment, RepoError> {
        Self::require_post(self.db.as_ref(), post_id).await?;

        let row = comment::ActiveModel::from_comment(post_id, comment)
            .insert(self.db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(row.into())
    }

    async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<Comment, RepoError> {
        let row = CommentEntity::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)?
            .ok_or(RepoError::NotFound)?;

        let mut active: comment::ActiveModel = row.into();
        active.text = Set(text);
        let row = active.update(self.db.as_ref()).await.map_err(db_error)?;
        Ok(row.into())
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<(), RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::Id.eq(comment_id))
            .filter(comment::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn find_comments_by_author(
        &self,
        author: &str,
    ) -> Result<Vec<AuthoredComment>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::Author.eq(author))
            .order_by_desc(comment::Column::CreatedAt)
            .find_also_related(PostEntity)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(row, post)| {
                let post = post?;
                Some(AuthoredComment {
                    comment: row.into(),
                    post_id: post.id,
                    post_title: post.title,
                })
            })
            .collect())
    }

    async fn add_like(&self, post_id: Uuid, user_id: &str) -> Result<usize, RepoError> {
        Self::require_post(self.db.as_ref(), post_id).await?;

        LikeEntity::insert(like::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id.to_string()),
            created_at: Set(Utc::now().into()),
        })
        .on_conflict(
            OnConflict::columns([like::Column::PostId, like::Column::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await
        .map_err(db_error)?;

        Self::like_count(self.db.as_ref(), post_id).await
    }

    async fn remove_like(&self, post_id: Uuid, user_id: &str) -> Result<usize, RepoError> {
        Self::require_post(self.db.as_ref(), post_id).await?;

        LikeEntity::delete_many()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Self::like_count(self.db.as_ref(), post_id).await
    }
}
