//! Service behaviour against the in-memory stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use toolreview_core::DomainError;
use toolreview_core::domain::{Actor, ConfirmOutcome, PostContent, Role, Section, ToolReview};
use toolreview_core::ports::{
    ImageError, ImageStore, ImageUpload, MailError, Mailer, OutgoingEmail, SecretGenerator,
};
use toolreview_core::services::{
    AccountService, AccountSettings, NewsletterService, PostService,
};

use super::{InMemoryNewsletterRepository, InMemoryPostRepository, InMemoryUserRepository};
use crate::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    fn last(&self) -> Option<OutgoingEmail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

#[derive(Default)]
struct CountingSecrets(AtomicUsize);

impl SecretGenerator for CountingSecrets {
    fn generate(&self) -> String {
        format!("secret-{}", self.0.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Default)]
struct FakeImages {
    removed: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for FakeImages {
    async fn store(&self, upload: ImageUpload) -> Result<String, ImageError> {
        Ok(format!("{}.webp", upload.original_name))
    }

    async fn remove(&self, filename: &str) -> Result<(), ImageError> {
        self.removed.lock().unwrap().push(filename.to_string());
        Ok(())
    }
}

fn admin() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        email: "admin@example.com".to_string(),
        role: Role::Admin,
    }
}

fn reader(email: &str) -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        email: email.to_string(),
        role: Role::User,
    }
}

fn post_service() -> (PostService, Arc<FakeImages>) {
    let images = Arc::new(FakeImages::default());
    let service = PostService::new(Arc::new(InMemoryPostRepository::new()), images.clone());
    (service, images)
}

fn content(title: &str) -> PostContent {
    PostContent {
        title: title.to_string(),
        summary: Some("A quick look".to_string()),
        tags: vec!["coding".to_string()],
        sections: vec![Section::heading("Verdict"), Section::text("Solid.")],
    }
}

fn account_service(
    allow_admin_registration: bool,
) -> (AccountService, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let service = AccountService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(Argon2PasswordService::new()),
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "memory-tests".to_string(),
            ..JwtConfig::default()
        })),
        Arc::new(CountingSecrets::default()),
        mailer.clone(),
        AccountSettings {
            client_url: "https://reviews.test/".to_string(),
            allow_admin_registration,
            ..AccountSettings::default()
        },
    );
    (service, mailer)
}

fn newsletter_service() -> (NewsletterService, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let service = NewsletterService::new(
        Arc::new(InMemoryNewsletterRepository::new()),
        Arc::new(CountingSecrets::default()),
        mailer.clone(),
        "https://reviews.test",
    );
    (service, mailer)
}

#[tokio::test]
async fn test_created_posts_get_distinct_ids() {
    let (posts, _) = post_service();
    let admin = admin();

    let first = posts.create(&admin, content("One"), None).await.unwrap();
    let second = posts.create(&admin, content("Two"), None).await.unwrap();

    assert_ne!(first.id, second.id);
    let listed: Vec<String> = posts.list().await.unwrap().into_iter().map(|p| p.title).collect();
    assert_eq!(listed, vec!["One", "Two"]);
}

#[tokio::test]
async fn test_create_requires_admin_and_title() {
    let (posts, _) = post_service();

    let refused = posts.create(&reader("r@example.com"), content("Nope"), None).await;
    assert!(matches!(refused, Err(DomainError::Forbidden(_))));

    let untitled = posts.create(&admin(), content("  "), None).await;
    assert!(matches!(untitled, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_create_rejects_non_image_upload() {
    let (posts, _) = post_service();
    let upload = ImageUpload {
        original_name: "notes.txt".to_string(),
        content_type: Some("text/plain".to_string()),
        bytes: b"hello".to_vec(),
    };

    let result = posts.create(&admin(), content("With file"), Some(upload)).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(posts.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sections_round_trip_in_order() {
    let (posts, _) = post_service();
    let mut draft = content("Ordered");
    draft.sections = vec![
        Section::heading("Intro"),
        Section::list(["fast", "cheap"]),
        Section::tool(ToolReview {
            name: "Copilot".to_string(),
            best_for: "autocomplete".to_string(),
            pros: vec!["inline".to_string()],
            cons: vec![],
        }),
        Section::from_raw(
            json!({"type": "poll", "question": "Useful?"})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap(),
    ];

    let created = posts.create(&admin(), draft.clone(), None).await.unwrap();
    let fetched = posts.get(created.id).await.unwrap();

    assert_eq!(fetched.sections, draft.sections);
    assert_eq!(fetched.sections[3].type_name(), "poll");
}

#[tokio::test]
async fn test_edit_replaces_content_and_keeps_image() {
    let (posts, _) = post_service();
    let admin = admin();
    let upload = ImageUpload {
        original_name: "cover".to_string(),
        content_type: Some("image/png".to_string()),
        bytes: vec![1, 2, 3],
    };
    let created = posts
        .create(&admin, content("Before"), Some(upload))
        .await
        .unwrap();

    let edited = posts
        .edit(
            &admin,
            created.id,
            PostContent {
                title: "After".to_string(),
                ..PostContent::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(edited.title, "After");
    assert!(edited.summary.is_none());
    assert!(edited.tags.is_empty());
    assert!(edited.sections.is_empty());
    assert_eq!(edited.image.as_deref(), Some("cover.webp"));
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let (posts, images) = post_service();
    let admin = admin();
    let upload = ImageUpload {
        original_name: "shot".to_string(),
        content_type: Some("image/jpeg".to_string()),
        bytes: vec![0xff],
    };
    let created = posts.create(&admin, content("Gone"), Some(upload)).await.unwrap();

    posts.delete(&admin, created.id).await.unwrap();

    assert!(matches!(
        posts.get(created.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        posts.delete(&admin, created.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert_eq!(*images.removed.lock().unwrap(), vec!["shot.webp".to_string()]);
}

#[tokio::test]
async fn test_like_and_unlike_are_idempotent() {
    let (posts, _) = post_service();
    let post = posts.create(&admin(), content("Liked"), None).await.unwrap();
    let alice = reader("alice@example.com");
    let bob = reader("bob@example.com");

    assert_eq!(posts.like(&alice, post.id).await.unwrap().likes, 1);
    assert_eq!(posts.like(&alice, post.id).await.unwrap().likes, 1);
    assert_eq!(posts.like(&bob, post.id).await.unwrap().likes, 2);

    let state = posts.unlike(&alice, post.id).await.unwrap();
    assert_eq!(state.likes, 1);
    assert!(!state.liked);
    assert_eq!(posts.unlike(&alice, post.id).await.unwrap().likes, 1);

    let stored = posts.get(post.id).await.unwrap();
    assert!(stored.is_liked_by(&bob.subject()));
    assert!(!stored.is_liked_by(&alice.subject()));
}

#[tokio::test]
async fn test_concurrent_likes_are_all_counted() {
    let (posts, _) = post_service();
    let post = posts.create(&admin(), content("Popular"), None).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let posts = posts.clone();
            let fan = reader(&format!("fan{i}@example.com"));
            tokio::spawn(async move { posts.like(&fan, post.id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(posts.get(post.id).await.unwrap().like_count(), 16);
}

#[tokio::test]
async fn test_like_missing_post_is_not_found() {
    let (posts, _) = post_service();

    let result = posts.like(&reader("a@example.com"), Uuid::new_v4()).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_comment_permissions() {
    let (posts, _) = post_service();
    let admin = admin();
    let author = reader("author@example.com");
    let other = reader("other@example.com");
    let post = posts.create(&admin, content("Discuss"), None).await.unwrap();

    let comment = posts
        .add_comment(&author, post.id, "First!".to_string())
        .await
        .unwrap();
    assert_eq!(comment.author, author.subject());
    assert_eq!(comment.author_email, "author@example.com");

    let refused = posts
        .edit_comment(&other, post.id, comment.id, "Hijack".to_string())
        .await;
    assert!(matches!(refused, Err(DomainError::Forbidden(_))));

    let edited = posts
        .edit_comment(&author, post.id, comment.id, "Second thoughts".to_string())
        .await
        .unwrap();
    assert_eq!(edited.text, "Second thoughts");

    posts.delete_comment(&admin, post.id, comment.id).await.unwrap();
    assert!(posts.comments(post.id).await.unwrap().is_empty());

    let missing = posts.delete_comment(&admin, post.id, comment.id).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_blank_comment_is_rejected() {
    let (posts, _) = post_service();
    let post = posts.create(&admin(), content("Quiet"), None).await.unwrap();

    let result = posts
        .add_comment(&reader("r@example.com"), post.id, "   ".to_string())
        .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_activity_by_author() {
    let (posts, _) = post_service();
    let admin = admin();
    let commenter = reader("c@example.com");
    let first = posts.create(&admin, content("First"), None).await.unwrap();
    let second = posts.create(&admin, content("Second"), None).await.unwrap();
    posts
        .add_comment(&commenter, first.id, "old".to_string())
        .await
        .unwrap();
    posts
        .add_comment(&commenter, second.id, "new".to_string())
        .await
        .unwrap();

    let authored = posts.posts_by_author(admin.user_id).await.unwrap();
    assert_eq!(authored.len(), 2);

    let comments = posts.comments_by_author(commenter.user_id).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].comment.text, "new");
    assert_eq!(comments[0].post_title, "Second");
}

#[tokio::test]
async fn test_register_login_and_authenticate() {
    let (accounts, _) = account_service(false);

    let session = accounts
        .register(" Reader@Example.com ", "longenough", None)
        .await
        .unwrap();
    assert_eq!(session.role, Role::User);
    assert_eq!(session.expires_in, 86400);

    let actor = accounts.authenticate(&session.token).await.unwrap();
    assert_eq!(actor.email, "reader@example.com");

    assert!(accounts.login("reader@example.com", "longenough").await.is_ok());
    assert!(matches!(
        accounts.login("reader@example.com", "wrong-password").await,
        Err(DomainError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_register_rules() {
    let (accounts, _) = account_service(false);

    assert!(matches!(
        accounts.register("bad-email", "longenough", None).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        accounts.register("a@example.com", "short", None).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        accounts.register("a@example.com", "longenough", Some(Role::Admin)).await,
        Err(DomainError::Forbidden(_))
    ));

    accounts.register("a@example.com", "longenough", None).await.unwrap();
    assert!(matches!(
        accounts.register("A@example.com", "longenough", None).await,
        Err(DomainError::Duplicate(_))
    ));
}

#[tokio::test]
async fn test_admin_registration_when_enabled() {
    let (accounts, _) = account_service(true);

    let session = accounts
        .register("boss@example.com", "longenough", Some(Role::Admin))
        .await
        .unwrap();
    let actor = accounts.authenticate(&session.token).await.unwrap();

    assert!(actor.is_admin());
}

#[tokio::test]
async fn test_password_reset_flow() {
    let (accounts, mailer) = account_service(false);
    accounts.register("r@example.com", "original-pw", None).await.unwrap();

    accounts.forgot_password("r@example.com").await.unwrap();
    let mail = mailer.last().unwrap();
    assert_eq!(mail.to, "r@example.com");
    assert!(mail.html.contains("https://reviews.test/reset-password/secret-0"));

    assert!(matches!(
        accounts.reset_password("secret-9", "brand-new-pw").await,
        Err(DomainError::Validation(_))
    ));
    accounts.reset_password("secret-0", "brand-new-pw").await.unwrap();

    assert!(accounts.login("r@example.com", "brand-new-pw").await.is_ok());
    assert!(accounts.reset_password("secret-0", "again-new-pw").await.is_err());
}

#[tokio::test]
async fn test_forgot_password_for_unknown_account_is_silent() {
    let (accounts, mailer) = account_service(false);

    accounts.forgot_password("ghost@example.com").await.unwrap();

    assert!(mailer.last().is_none());
}

#[tokio::test]
async fn test_newsletter_double_opt_in() {
    let (newsletter, mailer) = newsletter_service();

    let signup = newsletter.signup("Fan@Example.com").await.unwrap();
    assert!(!signup.confirmed);
    let mail = mailer.last().unwrap();
    assert!(
        mail.html
            .contains("https://reviews.test/newsletter-confirm?token=secret-0&email=fan%40example.com")
    );

    assert!(matches!(
        newsletter.signup("fan@example.com").await,
        Err(DomainError::Duplicate(_))
    ));
    assert!(matches!(
        newsletter.confirm("wrong", "fan@example.com").await,
        Err(DomainError::Validation(_))
    ));
    assert_eq!(
        newsletter.confirm("secret-0", "fan@example.com").await.unwrap(),
        ConfirmOutcome::Confirmed
    );

    let listed = newsletter.list(&admin()).await.unwrap();
    assert!(listed[0].confirmed);
}

#[tokio::test]
async fn test_newsletter_admin_operations() {
    let (newsletter, _) = newsletter_service();
    let signup = newsletter.signup("x@example.com").await.unwrap();

    assert!(matches!(
        newsletter.list(&reader("r@example.com")).await,
        Err(DomainError::Forbidden(_))
    ));
    assert!(matches!(
        newsletter.signup("not-an-email").await,
        Err(DomainError::Validation(_))
    ));

    newsletter.delete(&admin(), signup.id).await.unwrap();
    assert!(newsletter.list(&admin()).await.unwrap().is_empty());
    assert!(matches!(
        newsletter.delete(&admin(), signup.id).await,
        Err(DomainError::NotFound { .. })
    ));
}
