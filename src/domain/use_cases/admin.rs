use std::sync::Arc;

use uuid::Uuid;

use crate::{
    access::AccessPolicy,
    entities::{token::Principal, user::PublicUser},
    errors::AppError,
    repositories::user::UserRepository,
};

#[derive(Clone)]
pub struct AdminHandler {
    user_repo: Arc<dyn UserRepository>,
    policy: AccessPolicy,
}

impl AdminHandler {
    pub fn new(user_repo: Arc<dyn UserRepository>, policy: AccessPolicy) -> Self {
        AdminHandler { user_repo, policy }
    }

    pub async fn list_users(&self, actor: &Principal) -> Result<Vec<PublicUser>, AppError> {
        self.policy.ensure_admin(actor)?;
        let users = self.user_repo.list_users().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    /// Hard-deletes a user. The administrator account itself can never be deleted, not even by itself.
    pub async fn delete_user(&self, actor: &Principal, user_id: &Uuid) -> Result<(), AppError> {
        self.policy.ensure_admin(actor)?;

        let target = self.user_repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if self.policy.is_admin_email(&target.email) {
            tracing::warn!(actor = %actor.id, "Refused to delete the administrator account");
            return Err(AppError::ForbiddenAccess);
        }

        self.user_repo.delete_user(user_id).await?;
        tracing::info!(actor = %actor.id, deleted = %user_id, "User deleted by administrator");
        Ok(())
    }
}
