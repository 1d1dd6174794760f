use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::User;
use crate::store::{JobStore, UserStore};
use crate::utils::crypto;

const USER_NOT_FOUND: &str = "User not found";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    jobs: Arc<dyn JobStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, jobs: Arc<dyn JobStore>) -> Self {
        Self { users, jobs }
    }

    pub async fn update_profile(&self, user_id: Uuid, name: &str) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::BadRequest("Name is required".to_string()));
        }
        self.users
            .update_name(user_id, name)
            .await?
            .ok_or_else(|| Error::NotFound(USER_NOT_FOUND.to_string()))
    }

    /// Changes the password after checking the current one. Accounts that
    /// only ever signed in with Google have no password to check, so the
    /// current-password gate turns them away too.
    pub async fn update_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if old_password.is_empty() || new_password.is_empty() {
            return Err(Error::BadRequest(
                "Old password and new password are required".to_string(),
            ));
        }
        if new_password.chars().count() < 6 {
            return Err(Error::BadRequest(
                "New password must be 6+ chars".to_string(),
            ));
        }
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(USER_NOT_FOUND.to_string()))?;
        let matches = match user.password_hash.as_deref() {
            Some(hash) => crypto::verify_password(old_password, hash)?,
            None => false,
        };
        if !matches {
            return Err(Error::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }
        let password_hash = crypto::hash_password(new_password)?;
        self.users
            .update_password_hash(user_id, &password_hash)
            .await?
            .ok_or_else(|| Error::NotFound(USER_NOT_FOUND.to_string()))?;
        Ok(())
    }

    /// Removes the account and everything it owns. Jobs go first; a repeat
    /// call on an already deleted account is a no-op, not an error.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        self.jobs.delete_by_owner(user_id).await?;
        self.users.delete(user_id).await?;
        Ok(())
    }
}
