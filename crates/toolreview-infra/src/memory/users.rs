use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use toolreview_core::domain::User;
use toolreview_core::error::RepoError;
use toolreview_core::ports::{BaseRepository, UserRepository};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &[User], email: &str, except: Uuid) -> bool {
    users.iter().any(|u| u.id != except && u.email == email)
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id == user.id) || email_taken(&users, &user.email, user.id) {
            return Err(RepoError::Constraint("Email already registered".to_string()));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, user.id) {
            return Err(RepoError::Constraint("Email already registered".to_string()));
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.reset_token_matches(token, now))
            .cloned())
    }
}
