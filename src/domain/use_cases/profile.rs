use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        token::Principal,
        user::{PublicUser, UpdateProfile, UserProfile},
    },
    errors::AppError,
    repositories::user::UserRepository,
    use_cases::social_graph::SocialGraphHandler,
};

#[derive(Clone)]
pub struct ProfileHandler {
    user_repo: Arc<dyn UserRepository>,
    social_graph: SocialGraphHandler,
}

impl ProfileHandler {
    pub fn new(user_repo: Arc<dyn UserRepository>, social_graph: SocialGraphHandler) -> Self {
        ProfileHandler { user_repo, social_graph }
    }

    pub async fn me(&self, actor: &Principal) -> Result<UserProfile, AppError> {
        self.get_profile(&actor.id).await
    }

    /// Public profile with follower/following counts.
    pub async fn get_profile(&self, user_id: &Uuid) -> Result<UserProfile, AppError> {
        let user = self.user_repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let (followers_count, following_count) = self.social_graph.counts(user_id).await;

        Ok(UserProfile {
            user: PublicUser::from(user),
            followers_count,
            following_count,
        })
    }

    pub async fn update_profile(&self, actor: &Principal, changes: UpdateProfile) -> Result<PublicUser, AppError> {
        if changes.is_empty() {
            return Err(AppError::InvalidInput("Nothing to update".into()));
        }

        // Trimmed first so a whitespace-only name fails the length rule
        let changes = UpdateProfile {
            name: changes.name.map(|n| n.trim().to_string()),
            bio: changes.bio.map(|b| b.trim().to_string()),
            image: changes.image.map(|i| i.trim().to_string()),
        };
        changes.validate()?;

        let user = self.user_repo.update_profile(&actor.id, &changes).await?;
        tracing::info!(user_id = %actor.id, "Profile updated");
        Ok(PublicUser::from(user))
    }
}
