use std::sync::Arc;

use uuid::Uuid;

use crate::{
    constants::{DEFAULT_DISCOVER_LIMIT, MAX_DISCOVER_LIMIT},
    entities::{follow::Follow, token::Principal, user::UserSummary},
    errors::AppError,
    repositories::{follow::FollowRepository, user::UserRepository},
};

/// Directed follow graph between users.
///
/// Writes report distinct failure kinds. Reads never fail: a storage error
/// is logged and answered with an empty list, `false` or zero.
#[derive(Clone)]
pub struct SocialGraphHandler {
    follow_repo: Arc<dyn FollowRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl SocialGraphHandler {
    pub fn new(follow_repo: Arc<dyn FollowRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        SocialGraphHandler { follow_repo, user_repo }
    }

    pub async fn follow(&self, actor: &Principal, target_id: &Uuid) -> Result<Follow, AppError> {
        if actor.id == *target_id {
            return Err(AppError::InvalidInput("You cannot follow yourself".into()));
        }

        if !self.user_repo.user_exists(target_id).await? {
            return Err(AppError::NotFound("User not found".into()));
        }

        if self.follow_repo.find_follow(&actor.id, target_id).await?.is_some() {
            return Err(AppError::AlreadyExists("Already following this user".into()));
        }

        // A concurrent duplicate loses on the unique constraint and comes back as AlreadyExists
        let follow = self.follow_repo.create_follow(&actor.id, target_id).await?;
        tracing::info!(follower = %actor.id, following = %target_id, "Follow created");
        Ok(follow)
    }

    pub async fn unfollow(&self, actor: &Principal, target_id: &Uuid) -> Result<(), AppError> {
        if !self.follow_repo.delete_follow(&actor.id, target_id).await? {
            return Err(AppError::NotFound("Not following this user".into()));
        }
        tracing::info!(follower = %actor.id, following = %target_id, "Follow removed");
        Ok(())
    }

    pub async fn list_followers(&self, user_id: &Uuid) -> Vec<UserSummary> {
        self.follow_repo
            .list_followers(user_id)
            .await
            .unwrap_or_else(|e| degrade("list_followers", user_id, e))
    }

    pub async fn list_following(&self, user_id: &Uuid) -> Vec<UserSummary> {
        self.follow_repo
            .list_following(user_id)
            .await
            .unwrap_or_else(|e| degrade("list_following", user_id, e))
    }

    /// Users the actor might follow: everyone except the actor and those already followed.
    pub async fn discover(&self, actor: &Principal, limit: Option<u32>) -> Vec<UserSummary> {
        let limit = limit
            .unwrap_or(DEFAULT_DISCOVER_LIMIT)
            .clamp(1, MAX_DISCOVER_LIMIT);

        match self.follow_repo.discover_users(&actor.id, limit).await {
            Ok(users) => users
                .into_iter()
                .filter(|u| u.id != actor.id)
                .take(limit as usize)
                .collect(),
            Err(e) => degrade("discover", &actor.id, e),
        }
    }

    pub async fn is_following(&self, actor: &Principal, target_id: &Uuid) -> bool {
        match self.follow_repo.find_follow(&actor.id, target_id).await {
            Ok(edge) => edge.is_some(),
            Err(e) => {
                tracing::warn!(user = %actor.id, "is_following degraded to false: {}", e);
                false
            }
        }
    }

    /// Follower and following counts; zero when storage is unavailable.
    pub async fn counts(&self, user_id: &Uuid) -> (i64, i64) {
        let followers = self.follow_repo.count_followers(user_id).await.unwrap_or_else(|e| {
            tracing::warn!(user = %user_id, "count_followers degraded to 0: {}", e);
            0
        });
        let following = self.follow_repo.count_following(user_id).await.unwrap_or_else(|e| {
            tracing::warn!(user = %user_id, "count_following degraded to 0: {}", e);
            0
        });
        (followers, following)
    }
}

fn degrade<T>(operation: &str, user_id: &Uuid, error: AppError) -> Vec<T> {
    tracing::warn!(user = %user_id, "{} degraded to empty result: {}", operation, error);
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{follow::MockFollowRepository, user::MockUserRepository};
    use chrono::Utc;
    use mockall::predicate::eq;

    fn principal() -> Principal {
        Principal { id: Uuid::new_v4(), email: "ana@photomap.test".into() }
    }

    fn summary(id: Uuid) -> UserSummary {
        UserSummary { id, name: None, email: format!("{}@photomap.test", id), image: None }
    }

    fn handler(follows: MockFollowRepository, users: MockUserRepository) -> SocialGraphHandler {
        SocialGraphHandler::new(Arc::new(follows), Arc::new(users))
    }

    #[tokio::test]
    async fn self_follow_is_rejected_without_storage_access() {
        let actor = principal();
        let result = handler(MockFollowRepository::new(), MockUserRepository::new())
            .follow(&actor, &actor.id)
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn follow_unknown_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_user_exists().returning(|_| Ok(false));

        let result = handler(MockFollowRepository::new(), users)
            .follow(&principal(), &Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn existing_edge_is_already_exists() {
        let actor = principal();
        let target = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        users.expect_user_exists().returning(|_| Ok(true));
        let mut follows = MockFollowRepository::new();
        follows.expect_find_follow()
            .with(eq(actor.id), eq(target))
            .returning(move |f, t| Ok(Some(Follow {
                id: Uuid::new_v4(),
                follower_id: *f,
                following_id: *t,
                created_at: Utc::now(),
            })));
        follows.expect_create_follow().never();

        let result = handler(follows, users).follow(&actor, &target).await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn losing_a_concurrent_insert_is_already_exists() {
        let mut users = MockUserRepository::new();
        users.expect_user_exists().returning(|_| Ok(true));
        let mut follows = MockFollowRepository::new();
        follows.expect_find_follow().returning(|_, _| Ok(None));
        follows.expect_create_follow()
            .returning(|_, _| Err(AppError::AlreadyExists("Already following this user".into())));

        let result = handler(follows, users).follow(&principal(), &Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn follow_write_failures_propagate() {
        let mut users = MockUserRepository::new();
        users.expect_user_exists().returning(|_| Err(AppError::InternalError("db down".into())));

        let result = handler(MockFollowRepository::new(), users)
            .follow(&principal(), &Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }

    #[tokio::test]
    async fn unfollow_without_edge_is_not_found() {
        let mut follows = MockFollowRepository::new();
        follows.expect_delete_follow().returning(|_, _| Ok(false));

        let result = handler(follows, MockUserRepository::new())
            .unfollow(&principal(), &Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn listings_degrade_to_empty_on_storage_failure() {
        let mut follows = MockFollowRepository::new();
        follows.expect_list_followers().returning(|_| Err(AppError::InternalError("db down".into())));
        follows.expect_list_following().returning(|_| Err(AppError::InternalError("db down".into())));
        follows.expect_discover_users().returning(|_, _| Err(AppError::InternalError("db down".into())));
        follows.expect_find_follow().returning(|_, _| Err(AppError::InternalError("db down".into())));
        let graph = handler(follows, MockUserRepository::new());
        let actor = principal();

        assert!(graph.list_followers(&actor.id).await.is_empty());
        assert!(graph.list_following(&actor.id).await.is_empty());
        assert!(graph.discover(&actor, None).await.is_empty());
        assert!(!graph.is_following(&actor, &Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn discover_clamps_limit_and_never_returns_actor() {
        let actor = principal();
        let actor_id = actor.id;
        let mut follows = MockFollowRepository::new();
        follows.expect_discover_users()
            .with(eq(actor_id), eq(MAX_DISCOVER_LIMIT))
            .returning(move |_, _| Ok(vec![summary(actor_id), summary(Uuid::new_v4())]));

        let found = handler(follows, MockUserRepository::new())
            .discover(&actor, Some(10_000))
            .await;

        assert_eq!(found.len(), 1);
        assert!(found.iter().all(|u| u.id != actor_id));
    }

    #[tokio::test]
    async fn discover_defaults_to_fifty() {
        let mut follows = MockFollowRepository::new();
        follows.expect_discover_users()
            .withf(|_, limit| *limit == DEFAULT_DISCOVER_LIMIT)
            .returning(|_, _| Ok(Vec::new()));

        handler(follows, MockUserRepository::new()).discover(&principal(), None).await;
    }

    #[tokio::test]
    async fn counts_degrade_to_zero() {
        let mut follows = MockFollowRepository::new();
        follows.expect_count_followers().returning(|_| Ok(3));
        follows.expect_count_following().returning(|_| Err(AppError::InternalError("db down".into())));

        let counts = handler(follows, MockUserRepository::new()).counts(&Uuid::new_v4()).await;
        assert_eq!(counts, (3, 0));
    }
}
