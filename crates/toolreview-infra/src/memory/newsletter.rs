use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use toolreview_core::domain::NewsletterSignup;
use toolreview_core::error::RepoError;
use toolreview_core::ports::{BaseRepository, NewsletterRepository};

#[derive(Default)]
pub struct InMemoryNewsletterRepository {
    signups: RwLock<Vec<NewsletterSignup>>,
}

impl InMemoryNewsletterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<NewsletterSignup, Uuid> for InMemoryNewsletterRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NewsletterSignup>, RepoError> {
        Ok(self
            .signups
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn create(&self, signup: NewsletterSignup) -> Result<NewsletterSignup, RepoError> {
        let mut signups = self.signups.write().await;
        if signups
            .iter()
            .any(|s| s.id == signup.id || s.email == signup.email)
        {
            return Err(RepoError::Constraint("Email already subscribed.".to_string()));
        }
        signups.push(signup.clone());
        Ok(signup)
    }

    async fn update(&self, signup: NewsletterSignup) -> Result<NewsletterSignup, RepoError> {
        let mut signups = self.signups.write().await;
        let slot = signups
            .iter_mut()
            .find(|s| s.id == signup.id)
            .ok_or(RepoError::NotFound)?;
        *slot = signup.clone();
        Ok(signup)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut signups = self.signups.write().await;
        let before = signups.len();
        signups.retain(|s| s.id != id);
        if signups.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl NewsletterRepository for InMemoryNewsletterRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSignup>, RepoError> {
        Ok(self
            .signups
            .read()
            .await
            .iter()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<NewsletterSignup>, RepoError> {
        let mut all = self.signups.read().await.clone();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }
}
