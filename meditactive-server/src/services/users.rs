//! User service

use std::sync::Arc;

use tracing::{info, instrument};

use super::ServiceError;
use crate::db::{DbError, User, UserStore};
use crate::models::{Email, NewUser, UserFields, UserPatch};

/// User operations over a [`UserStore`]
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

fn email_conflict(email: &str, e: DbError) -> ServiceError {
    match e {
        DbError::Duplicate { .. } => {
            ServiceError::Conflict(format!("email '{email}' is already in use"))
        }
        other => other.into(),
    }
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[instrument(skip_all)]
    pub async fn create(&self, fields: UserFields) -> Result<User, ServiceError> {
        let user = NewUser::try_from(fields)?;
        let created = self
            .store
            .insert(&user)
            .await
            .map_err(|e| email_conflict(user.email.as_str(), e))?;

        info!(user_id = created.id, "user created");
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: i64) -> Result<User, ServiceError> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    #[instrument(skip(self, fields))]
    pub async fn update(&self, id: i64, fields: UserFields) -> Result<User, ServiceError> {
        let patch = UserPatch::try_from(fields)?;
        let updated = self.store.update(id, &patch).await.map_err(|e| {
            let email = patch.email.as_ref().map(Email::as_str).unwrap_or_default();
            email_conflict(email, e)
        })?;

        updated.ok_or_else(|| ServiceError::not_found("user", id))
    }

    /// Delete a user together with their intervals and goals.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.store.delete(id).await? {
            return Err(ServiceError::not_found("user", id));
        }
        info!(user_id = id, "user deleted");
        Ok(())
    }
}
