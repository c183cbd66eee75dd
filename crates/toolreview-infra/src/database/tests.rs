use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use serde_json::json;
use uuid::Uuid;

use toolreview_core::domain::{Post, Role, SectionKind, User};
use toolreview_core::error::RepoError;
use toolreview_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::entity::{comment, like, post, user};
use super::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_row(id: Uuid) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id: None,
        title: "Cursor, six months in".to_owned(),
        summary: Some("Worth it?".to_owned()),
        tags: json!(["coding", "editors"]),
        sections: json!([
            {"type": "heading", "content": "Verdict"},
            {"type": "tool", "tool": {"name": "Cursor", "bestFor": "refactors", "pros": ["fast"], "cons": []}}
        ]),
        image: Some("1700000000000-cover.webp".to_owned()),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

#[tokio::test]
async fn test_find_post_by_id_assembles_comments_and_likes() {
    let post_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(post_id)]])
        .append_query_results([vec![comment::Model {
            id: Uuid::new_v4(),
            post_id,
            text: "Agreed".to_owned(),
            author: "user-1".to_owned(),
            author_email: "one@example.com".to_owned(),
            created_at: now.into(),
        }]])
        .append_query_results([vec![
            like::Model {
                post_id,
                user_id: "user-1".to_owned(),
                created_at: now.into(),
            },
            like::Model {
                post_id,
                user_id: "user-2".to_owned(),
                created_at: now.into(),
            },
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.tags, vec!["coding", "editors"]);
    assert_eq!(post.sections.len(), 2);
    assert_eq!(post.sections[1].kind(), Some(SectionKind::Tool));
    assert_eq!(post.comments.len(), 1);
    assert_eq!(post.comments[0].text, "Agreed");
    assert_eq!(post.like_count(), 2);
    assert!(post.is_liked_by("user-2"));
}

#[tokio::test]
async fn test_missing_post_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_like_returns_the_stored_count() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(post_id)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .append_query_results([vec![count_row(3)]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    assert_eq!(repo.add_like(post_id, "user-9").await.unwrap(), 3);
}

#[tokio::test]
async fn test_like_on_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    assert!(matches!(
        repo.add_like(Uuid::new_v4(), "user-9").await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_delete_missing_comment_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    assert!(matches!(
        repo.delete_comment(Uuid::new_v4(), Uuid::new_v4()).await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_find_user_by_email_maps_role() {
    let now = Utc::now();
    let id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id,
            email: "admin@example.com".to_owned(),
            password_hash: "$argon2id$hash".to_owned(),
            role: "admin".to_owned(),
            reset_token: None,
            reset_expires: None,
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(Arc::new(db));

    let user: User = repo.find_by_email("admin@example.com").await.unwrap().unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_repositories_share_one_pool() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection(),
    );

    let users = PostgresUserRepository::new(db.clone());
    let posts = PostgresPostRepository::new(db.clone());

    assert!(users.find_by_email("nobody@example.com").await.unwrap().is_none());
    assert!(posts.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    assert_eq!(Arc::strong_count(&db), 3);
}
