use std::sync::Arc;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::user::{UpdateProfile, UpsertUser, User};
use crate::utils::time::Clock;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Brings the stored record in line with what the identity provider
    /// asserted for this caller.
    pub async fn sync(&self, identity: UpsertUser) -> Result<User> {
        let user = self.store.upsert_user(identity, self.clock.now()).await?;
        tracing::debug!(user_id = %user.id, is_admin = user.is_admin, "user synced");
        Ok(user)
    }

    pub async fn update_profile(&self, id: &str, profile: UpdateProfile) -> Result<User> {
        self.store
            .update_profile(id, profile, self.clock.now())
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn list_active(&self) -> Result<Vec<User>> {
        self.store.list_active_users().await
    }
}
