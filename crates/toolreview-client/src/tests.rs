use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

use toolreview_core::domain::{Post, PostContent, Section};

use crate::api::{ClientError, PostDraft, PostsApi};
use crate::cache::PostCache;
use crate::editor::{EditorField, PostEditor};

/// In-process stand-in for the server.
#[derive(Default)]
struct FakeApi {
    posts: Mutex<Vec<Post>>,
    list_calls: Mutex<usize>,
    fail_with: Mutex<Option<(u16, String)>>,
    /// When set, list requests wait for a notification.
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    fn with_posts(posts: Vec<Post>) -> Arc<Self> {
        Arc::new(Self {
            posts: Mutex::new(posts),
            ..Self::default()
        })
    }

    fn fail_next(&self, status: u16, message: &str) {
        *self.fail_with.lock().unwrap() = Some((status, message.to_string()));
    }

    fn check(&self) -> Result<(), ClientError> {
        match self.fail_with.lock().unwrap().take() {
            Some((status, message)) => Err(ClientError::Api { status, message }),
            None => Ok(()),
        }
    }

    fn not_found() -> ClientError {
        ClientError::Api {
            status: 404,
            message: "Post not found".to_string(),
        }
    }

    /// Replace a stored post behind the cache's back.
    fn retitle(&self, id: Uuid, title: &str) {
        for post in self.posts.lock().unwrap().iter_mut().filter(|p| p.id == id) {
            post.title = title.to_string();
        }
    }
}

fn content(draft: &PostDraft) -> PostContent {
    PostContent {
        title: draft.title.clone(),
        summary: Some(draft.summary.clone()).filter(|s| !s.is_empty()),
        tags: draft.tags.clone(),
        sections: draft.sections.clone(),
    }
}

#[async_trait]
impl PostsApi for FakeApi {
    async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        self.check()?;
        *self.list_calls.lock().unwrap() += 1;
        let gate = self.gate.lock().unwrap().clone();
        match gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn get_post(&self, id: Uuid) -> Result<Post, ClientError> {
        self.check()?;
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, ClientError> {
        self.check()?;
        let image = draft.image.as_ref().map(|_| "1-cover.webp".to_string());
        let post = Post::new(None, content(draft), image);
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, draft: &PostDraft) -> Result<Post, ClientError> {
        self.check()?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(Self::not_found)?;
        post.replace_content(content(draft));
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        self.check()?;
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }
}

fn post(title: &str) -> Post {
    Post::new(
        None,
        PostContent {
            title: title.to_string(),
            sections: vec![Section::heading(title)],
            ..PostContent::default()
        },
        None,
    )
}

fn draft(title: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        ..PostDraft::default()
    }
}

#[tokio::test]
async fn test_load_fetches_once() {
    let api = FakeApi::with_posts(vec![post("One"), post("Two")]);
    let cache = PostCache::new(api.clone());

    cache.load().await.unwrap();
    cache.load().await.unwrap();

    assert_eq!(*api.list_calls.lock().unwrap(), 1);
    let titles: Vec<_> = cache.posts().await.into_iter().map(|p| p.title).collect();
    assert_eq!(titles, vec!["One", "Two"]);

    cache.refresh().await.unwrap();
    assert_eq!(*api.list_calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_loads_fetch_once() {
    let api = FakeApi::with_posts(vec![post("One")]);
    let cache = PostCache::new(api.clone());

    let (first, second) = tokio::join!(cache.load(), cache.load());

    first.unwrap();
    second.unwrap();
    assert_eq!(*api.list_calls.lock().unwrap(), 1);
    assert_eq!(cache.posts().await.len(), 1);
}

#[tokio::test]
async fn test_loading_flag_tracks_requests() {
    let api = FakeApi::with_posts(vec![post("One")]);
    let gate = Arc::new(Notify::new());
    *api.gate.lock().unwrap() = Some(gate.clone());
    let cache = PostCache::new(api.clone());
    assert!(!cache.is_loading());

    let observe = async {
        tokio::task::yield_now().await;
        let during = cache.is_loading();
        gate.notify_one();
        during
    };
    let (loaded, during) = tokio::join!(cache.load(), observe);

    loaded.unwrap();
    assert!(during);
    assert!(!cache.is_loading());
}

#[tokio::test]
async fn test_mutations_reconcile_the_list() {
    let api = FakeApi::with_posts(vec![post("Existing")]);
    let cache = PostCache::new(api.clone());
    cache.load().await.unwrap();

    let added = cache.add_post(&draft("Added")).await.unwrap();
    assert_eq!(cache.posts().await.last().map(|p| p.id), Some(added.id));

    let edited = cache.edit_post(added.id, &draft("Edited")).await.unwrap();
    assert_eq!(edited.title, "Edited");
    assert_eq!(cache.cached(added.id).await.unwrap().title, "Edited");
    assert_eq!(cache.posts().await.len(), 2);

    cache.delete_post(added.id).await.unwrap();
    assert!(cache.cached(added.id).await.is_none());
    assert_eq!(cache.posts().await.len(), 1);
    assert!(cache.last_error().await.is_none());
}

#[tokio::test]
async fn test_get_post_refreshes_cached_entry() {
    let existing = post("Old title");
    let id = existing.id;
    let api = FakeApi::with_posts(vec![existing]);
    let cache = PostCache::new(api.clone());
    cache.load().await.unwrap();

    api.retitle(id, "New title");
    let fetched = cache.get_post(id).await.unwrap();

    assert_eq!(fetched.title, "New title");
    assert_eq!(cache.cached(id).await.unwrap().title, "New title");
    assert_eq!(cache.posts().await.len(), 1);

    cache.invalidate(id).await;
    assert!(cache.cached(id).await.is_none());
}

#[tokio::test]
async fn test_failures_leave_a_displayable_error() {
    let api = FakeApi::with_posts(vec![post("Kept")]);
    let cache = PostCache::new(api.clone());
    cache.load().await.unwrap();

    api.fail_next(403, "admin role required");
    let err = cache.add_post(&draft("Nope")).await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert_eq!(cache.last_error().await.as_deref(), Some("admin role required"));
    assert_eq!(cache.posts().await.len(), 1);

    assert!(cache.delete_post(Uuid::new_v4()).await.is_err());
    assert_eq!(cache.posts().await.len(), 1);

    cache.refresh().await.unwrap();
    assert!(cache.last_error().await.is_none());
}

#[tokio::test]
async fn test_editor_submits_through_cache() {
    let api = FakeApi::with_posts(Vec::new());
    let cache = PostCache::new(api.clone());
    cache.load().await.unwrap();

    let mut editor = PostEditor::new();
    editor.set_title("Fresh review");
    editor.set_tags("ai, tools");
    editor.add_section();
    editor.edit_field(0, EditorField::Content, "Intro").unwrap();
    let created = editor.submit(&cache).await.unwrap();
    assert_eq!(created.tags, vec!["ai", "tools"]);

    let mut editor = PostEditor::for_post(&created);
    assert_eq!(editor.editing(), Some(created.id));
    editor.set_title("Revised review");
    let updated = editor.submit(&cache).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.sections, vec![Section::text("Intro")]);
    assert_eq!(cache.posts().await.len(), 1);
    assert_eq!(cache.cached(created.id).await.unwrap().title, "Revised review");
}
