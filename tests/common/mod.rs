#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::NormalizePath,
    test, web, App, Error,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use photomap_backend::{
    auth::{jwt::JwtService, password::hash_password},
    entities::{
        follow::Follow,
        geolocation::{ImageSource, LocationCandidate},
        photo::{Photo, PhotoInsert},
        token::AuthResponse,
        user::{UpdateProfile, User, UserInsert, UserSummary},
    },
    errors::AppError,
    middlewares::auth::AuthMiddleware,
    repositories::{
        follow::FollowRepository,
        geolocation::GeoLocator,
        image_store::{ImageStore, ImageUpload, StoredImage},
        photo::PhotoRepository,
        user::UserRepository,
    },
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    shared_repos::SharedRepositories,
    AppState,
};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@photomap.test";
pub const PASSWORD: &str = "azulejo-tiles-1987";

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "PhotoMap Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url: "postgres://localhost/photomap_test".into(),
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: "integration_jwt_secret_that_is_long_enough_1234567890".into(),
        jwt_expiration_minutes: 5,
        refresh_token_secret: "integration_refresh_secret_long_enough_1234567890".into(),
        refresh_token_exp_days: 1,
        admin_email: ADMIN_EMAIL.into(),
        image_store_url: "http://127.0.0.1:9/images".into(),
        image_store_api_key: None,
        geo_api_url: "http://127.0.0.1:9/classify".into(),
        geo_api_key: None,
        geo_timeout_secs: 5,
        geo_top_k: 3,
        geo_min_confidence: 0.1,
        detect_requests_per_minute: 2,
    }
}

/// Users, follows and photos kept in memory with the same uniqueness and cascade rules as the schema.
#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<Vec<User>>,
    follows: Mutex<Vec<Follow>>,
    photos: Mutex<Vec<Photo>>,
    pub fail_reads: AtomicBool,
}

impl InMemoryStore {
    fn read_guard(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(AppError::InternalError("storage unavailable".into()))
        } else {
            Ok(())
        }
    }

    fn summary(&self, id: &Uuid) -> Option<UserSummary> {
        self.users.lock().iter().find(|u| u.id == *id).cloned().map(UserSummary::from)
    }

    pub fn follow_count(&self) -> usize {
        self.follows.lock().len()
    }

    pub fn photo_count(&self) -> usize {
        self.photos.lock().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn check_connection(&self) -> Result<(), AppError> {
        self.read_guard()
    }

    async fn user_exists(&self, id: &Uuid) -> Result<bool, AppError> {
        Ok(self.users.lock().iter().any(|u| u.id == *id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &UserInsert) -> Result<Uuid, AppError> {
        let mut users = self.users.lock();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists("User with this email already exists".into()));
        }
        let id = Uuid::new_v4();
        users.push(User {
            id,
            email: user.email.clone(),
            name: user.name.clone(),
            image: None,
            bio: None,
            password_hash: Some(user.password_hash.clone()),
            created_at: user.created_at,
        });
        Ok(id)
    }

    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().iter().find(|u| u.id == *id).cloned())
    }

    async fn update_profile(&self, id: &Uuid, changes: &UpdateProfile) -> Result<User, AppError> {
        let mut users = self.users.lock();
        let user = users
            .iter_mut()
            .find(|u| u.id == *id)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        if let Some(name) = &changes.name {
            user.name = Some(name.clone());
        }
        if let Some(bio) = &changes.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(image) = &changes.image {
            user.image = Some(image.clone());
        }
        Ok(user.clone())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.lock().iter().rev().cloned().collect())
    }

    async fn delete_user(&self, id: &Uuid) -> Result<(), AppError> {
        let mut users = self.users.lock();
        let before = users.len();
        users.retain(|u| u.id != *id);
        if users.len() == before {
            return Err(AppError::NotFound("User not found".into()));
        }
        self.follows.lock().retain(|f| f.follower_id != *id && f.following_id != *id);
        self.photos.lock().retain(|p| p.user_id != *id);
        Ok(())
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn find_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<Option<Follow>, AppError> {
        self.read_guard()?;
        Ok(self
            .follows
            .lock()
            .iter()
            .find(|f| f.follower_id == *follower_id && f.following_id == *following_id)
            .cloned())
    }

    async fn create_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<Follow, AppError> {
        if !self.users.lock().iter().any(|u| u.id == *following_id) {
            return Err(AppError::NotFound("Referenced record does not exist".into()));
        }
        let mut follows = self.follows.lock();
        if follows.iter().any(|f| f.follower_id == *follower_id && f.following_id == *following_id) {
            return Err(AppError::AlreadyExists("Already following this user".into()));
        }
        let follow = Follow {
            id: Uuid::new_v4(),
            follower_id: *follower_id,
            following_id: *following_id,
            created_at: Utc::now(),
        };
        follows.push(follow.clone());
        Ok(follow)
    }

    async fn delete_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<bool, AppError> {
        let mut follows = self.follows.lock();
        let before = follows.len();
        follows.retain(|f| !(f.follower_id == *follower_id && f.following_id == *following_id));
        Ok(follows.len() < before)
    }

    async fn list_followers(&self, user_id: &Uuid) -> Result<Vec<UserSummary>, AppError> {
        self.read_guard()?;
        let ids: Vec<Uuid> = self
            .follows
            .lock()
            .iter()
            .rev()
            .filter(|f| f.following_id == *user_id)
            .map(|f| f.follower_id)
            .collect();
        Ok(ids.iter().filter_map(|id| self.summary(id)).collect())
    }

    async fn list_following(&self, user_id: &Uuid) -> Result<Vec<UserSummary>, AppError> {
        self.read_guard()?;
        let ids: Vec<Uuid> = self
            .follows
            .lock()
            .iter()
            .rev()
            .filter(|f| f.follower_id == *user_id)
            .map(|f| f.following_id)
            .collect();
        Ok(ids.iter().filter_map(|id| self.summary(id)).collect())
    }

    async fn discover_users(&self, actor_id: &Uuid, limit: u32) -> Result<Vec<UserSummary>, AppError> {
        self.read_guard()?;
        let followed: Vec<Uuid> = self
            .follows
            .lock()
            .iter()
            .filter(|f| f.follower_id == *actor_id)
            .map(|f| f.following_id)
            .collect();
        Ok(self
            .users
            .lock()
            .iter()
            .rev()
            .filter(|u| u.id != *actor_id && !followed.contains(&u.id))
            .take(limit as usize)
            .cloned()
            .map(UserSummary::from)
            .collect())
    }

    async fn count_followers(&self, user_id: &Uuid) -> Result<i64, AppError> {
        self.read_guard()?;
        Ok(self.follows.lock().iter().filter(|f| f.following_id == *user_id).count() as i64)
    }

    async fn count_following(&self, user_id: &Uuid) -> Result<i64, AppError> {
        self.read_guard()?;
        Ok(self.follows.lock().iter().filter(|f| f.follower_id == *user_id).count() as i64)
    }
}

#[async_trait]
impl PhotoRepository for InMemoryStore {
    async fn create_photo(&self, photo: &PhotoInsert) -> Result<Photo, AppError> {
        let created = Photo {
            id: Uuid::new_v4(),
            user_id: photo.user_id,
            title: photo.title.clone(),
            image_url: photo.image_url.clone(),
            location: photo.location.clone(),
            latitude: photo.latitude,
            longitude: photo.longitude,
            created_at: photo.created_at,
        };
        self.photos.lock().push(created.clone());
        Ok(created)
    }

    async fn get_photo_by_id(&self, id: &Uuid) -> Result<Option<Photo>, AppError> {
        Ok(self.photos.lock().iter().find(|p| p.id == *id).cloned())
    }

    async fn delete_photo(&self, id: &Uuid) -> Result<bool, AppError> {
        let mut photos = self.photos.lock();
        let before = photos.len();
        photos.retain(|p| p.id != *id);
        Ok(photos.len() < before)
    }

    async fn list_photos_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Photo>, AppError> {
        Ok(self.photos.lock().iter().rev().filter(|p| p.user_id == *owner_id).cloned().collect())
    }

    async fn list_geotagged_photos(&self) -> Result<Vec<Photo>, AppError> {
        Ok(self
            .photos
            .lock()
            .iter()
            .rev()
            .filter(|p| p.latitude.is_some() && p.longitude.is_some())
            .cloned()
            .collect())
    }
}

/// Object store that remembers what it holds.
#[derive(Default)]
pub struct FakeImageStore {
    pub stored: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn upload_image(&self, image: ImageUpload) -> Result<StoredImage, AppError> {
        let key = format!("{}-{}", Uuid::new_v4(), image.file_name);
        self.stored.lock().push(key.clone());
        Ok(StoredImage { url: format!("https://img.test/{}", key), key })
    }

    async fn delete_image(&self, key: &str) -> Result<(), AppError> {
        self.stored.lock().retain(|k| k != key);
        Ok(())
    }
}

/// Classifier answering with fixed candidates, counting calls.
#[derive(Default)]
pub struct FakeGeoLocator {
    pub calls: AtomicUsize,
}

#[async_trait]
impl GeoLocator for FakeGeoLocator {
    async fn locate(&self, _image: &ImageSource, _top_k: u8) -> Result<Vec<LocationCandidate>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            LocationCandidate { latitude: 41.15, longitude: -8.61, confidence: 0.2, location_name: Some("Porto".into()) },
            LocationCandidate { latitude: 38.71, longitude: -9.13, confidence: 0.6, location_name: Some("Lisbon".into()) },
            LocationCandidate { latitude: 0.0, longitude: 0.0, confidence: 0.01, location_name: None },
        ])
    }
}

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub images: Arc<FakeImageStore>,
    pub locator: Arc<FakeGeoLocator>,
    pub tokens: Arc<JwtService>,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(InMemoryStore::default());
        let images = Arc::new(FakeImageStore::default());
        let locator = Arc::new(FakeGeoLocator::default());
        let tokens = Arc::new(JwtService::new(&config));

        let repos = SharedRepositories {
            user_repo: store.clone(),
            follow_repo: store.clone(),
            photo_repo: store.clone(),
            token_service: tokens.clone(),
            image_store: images.clone(),
            geo_locator: Some(locator.clone() as Arc<dyn GeoLocator>),
        };
        let state = web::Data::new(AppState::from_repositories(&config, repos));

        TestContext { store, images, locator, tokens, state }
    }

    /// Inserts a user directly and returns its id with a session token.
    pub async fn user(&self, email: &str) -> (Uuid, String) {
        let id = self
            .store
            .create_user(&UserInsert {
                email: email.to_string(),
                name: Some(email.split('@').next().unwrap_or(email).to_string()),
                password_hash: hash_password(PASSWORD).unwrap(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let user = self.store.get_user_by_id(&id).await.unwrap().unwrap();
        let AuthResponse { access_token, .. } = self.state.auth_handler.create_auth_response(&user).unwrap();
        (id, access_token)
    }
}

/// The application as `main` assembles it, minus CORS and request logging.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(AuthMiddleware)
        .wrap(NormalizePath::trim())
        .configure(configure_routes)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub async fn json_body(resp: ServiceResponse<impl MessageBody>) -> serde_json::Value {
    test::read_body_json(resp).await
}
