//! Session-wide post list that reconciles with the API after each mutation.
//!
//! The list is fetched once by [`PostCache::load`]. Single-post fetches go to
//! the network and their result replaces the cached entry with the same id,
//! so the list and detail views never disagree.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use toolreview_core::domain::Post;

use crate::api::{ClientError, PostDraft, PostsApi};

pub struct PostCache {
    api: Arc<dyn PostsApi>,
    posts: RwLock<Vec<Post>>,
    /// Held across the initial fetch so concurrent loads wait for it.
    loaded: Mutex<bool>,
    in_flight: AtomicUsize,
    last_error: RwLock<Option<String>>,
}

/// Counts a request as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PostCache {
    pub fn new(api: Arc<dyn PostsApi>) -> Self {
        Self {
            api,
            posts: RwLock::new(Vec::new()),
            loaded: Mutex::new(false),
            in_flight: AtomicUsize::new(0),
            last_error: RwLock::new(None),
        }
    }

    /// Fetch the full list unless it has already been fetched.
    pub async fn load(&self) -> Result<(), ClientError> {
        let mut loaded = self.loaded.lock().await;
        if !*loaded {
            self.fetch_all().await?;
            *loaded = true;
        }
        Ok(())
    }

    /// Re-fetch the full list, replacing whatever is cached.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let mut loaded = self.loaded.lock().await;
        self.fetch_all().await?;
        *loaded = true;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<(), ClientError> {
        let posts = self.track(self.api.list_posts(), "Error fetching posts").await?;
        *self.posts.write().await = posts;
        Ok(())
    }

    /// Snapshot of the cached list, in server order.
    pub async fn posts(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    pub async fn cached(&self, id: Uuid) -> Option<Post> {
        self.posts.read().await.iter().find(|p| p.id == id).cloned()
    }

    /// Fetch one post from the server and store it in the cache.
    pub async fn get_post(&self, id: Uuid) -> Result<Post, ClientError> {
        let post = self.track(self.api.get_post(id), "Error fetching post").await?;

        let mut posts = self.posts.write().await;
        match posts.iter_mut().find(|p| p.id == id) {
            Some(slot) => *slot = post.clone(),
            None => posts.push(post.clone()),
        }
        Ok(post)
    }

    pub async fn add_post(&self, draft: &PostDraft) -> Result<Post, ClientError> {
        let post = self
            .track(self.api.create_post(draft), "Error adding post")
            .await?;

        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    pub async fn edit_post(&self, id: Uuid, draft: &PostDraft) -> Result<Post, ClientError> {
        let post = self
            .track(self.api.update_post(id, draft), "Error editing post")
            .await?;

        for slot in self.posts.write().await.iter_mut().filter(|p| p.id == id) {
            *slot = post.clone();
        }
        Ok(post)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        self.track(self.api.delete_post(id), "Error deleting post")
            .await?;

        self.invalidate(id).await;
        Ok(())
    }

    /// Drop a cached entry without contacting the server.
    pub async fn invalidate(&self, id: Uuid) {
        self.posts.write().await.retain(|p| p.id != id);
    }

    /// True while any request started by the cache is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Displayable text of the most recent failure, cleared by the next success.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    async fn track<T>(
        &self,
        call: impl Future<Output = Result<T, ClientError>>,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let result = {
            let _in_flight = InFlight::enter(&self.in_flight);
            call.await
        };

        let mut last_error = self.last_error.write().await;
        match &result {
            Ok(_) => *last_error = None,
            Err(err) => {
                tracing::warn!(error = %err, "{fallback}");
                *last_error = Some(err.display_message(fallback));
            }
        }
        result
    }
}
