use std::time::Duration;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod shared_repos;

pub use domain::{access, entities, password, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, geo, limiter, storage, utils};

use access::AccessPolicy;
use errors::AppError;
use limiter::rate_limiter::RateLimiterStore;
use shared_repos::SharedRepositories;
use use_cases::{
    admin::AdminHandler,
    auth::AuthHandler,
    geolocation::LocationHandler,
    photos::PhotoHandler,
    profile::ProfileHandler,
    social_graph::SocialGraphHandler,
};

pub struct AppState {
    pub auth_handler: AuthHandler,
    pub profile_handler: ProfileHandler,
    pub social_graph: SocialGraphHandler,
    pub photo_handler: PhotoHandler,
    pub admin_handler: AdminHandler,
    pub location_handler: LocationHandler,
    pub access_policy: AccessPolicy,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Result<Self, AppError> {
        let repos = SharedRepositories::new(config, pool)?;
        Ok(Self::from_repositories(config, repos))
    }

    /// Wires the use cases over any set of repositories and external services.
    pub fn from_repositories(config: &settings::AppConfig, repos: SharedRepositories) -> Self {
        let access_policy = AccessPolicy::new(config.admin_email.clone());

        let auth_handler = AuthHandler::new(repos.user_repo.clone(), repos.token_service.clone());
        let social_graph = SocialGraphHandler::new(repos.follow_repo.clone(), repos.user_repo.clone());
        let profile_handler = ProfileHandler::new(repos.user_repo.clone(), social_graph.clone());
        let photo_handler = PhotoHandler::new(
            repos.photo_repo.clone(),
            repos.image_store.clone(),
            access_policy.clone(),
        );
        let admin_handler = AdminHandler::new(repos.user_repo.clone(), access_policy.clone());
        let location_handler = LocationHandler::new(
            repos.geo_locator.clone(),
            RateLimiterStore::per_minute(config.detect_requests_per_minute),
            config.geo_top_k,
            config.geo_min_confidence,
            Duration::from_secs(config.geo_timeout_secs),
        );

        AppState {
            auth_handler,
            profile_handler,
            social_graph,
            photo_handler,
            admin_handler,
            location_handler,
            access_policy,
        }
    }
}
