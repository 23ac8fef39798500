use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::entities::token::{AuthResponse, Principal};
use crate::entities::user::{LoginUser, NewUser, NewUserResponse, User};
use crate::errors::{AppError, AuthError};
use crate::interfaces::repositories::user::UserRepository;
use crate::auth::password::{hash_password, verify_against_dummy, verify_password};
use crate::repositories::token::TokenServiceRepository;

#[derive(Clone)]
pub struct AuthHandler {
    pub user_repo: Arc<dyn UserRepository>,
    pub token_service: Arc<dyn TokenServiceRepository>,
}

impl AuthHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_service: Arc<dyn TokenServiceRepository>,
    ) -> Self {
        AuthHandler {
            user_repo,
            token_service
        }
    }

    /// Registers a new user after validation and password hashing
    pub async fn register(&self, request: NewUser) -> Result<NewUserResponse, AppError> {
        request.validate()?;

        let hashed_password = hash_password(&request.password)?;
        let user_insert = request.prepare_for_insert(hashed_password);

        let id = self.user_repo.create_user(&user_insert).await?;
        tracing::info!(user_id = %id, "User registered");

        Ok(NewUserResponse {
            id,
            message: "User created successfully".to_string(),
        })
    }

    /// Logs in a user by validating credentials and issuing a session token pair
    pub async fn login(&self, request: LoginUser) -> Result<AuthResponse, AuthError> {
        request.validate().map_err(|_| AuthError::WrongCredentials)?;

        let user = self.user_repo.get_user_by_email(request.email.trim())
            .await
            .map_err(|e| {
                tracing::error!("User lookup failed during login: {}", e);
                AuthError::StoreUnavailable
            })?;

        // Unknown email and password-less accounts fail exactly like a wrong password
        let Some((user, hash)) = user.and_then(|u| u.password_hash.clone().map(|h| (u, h))) else {
            verify_against_dummy(&request.password);
            return Err(AuthError::WrongCredentials);
        };

        let is_password_valid = verify_password(&request.password, &hash)
            .map_err(|e| {
                tracing::warn!("Stored password hash unusable: {}", e);
                AuthError::WrongCredentials
            })?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        let response = self.create_auth_response(&user)?;

        tracing::info!(user_id = %user.id, "User logged in successfully");
        Ok(response)
    }

    pub fn create_auth_response(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_jwt(user)?;
        let refresh_token = self.token_service.create_refresh_jwt(&user.id)?;
        Ok(AuthResponse::new(access_token, refresh_token))
    }

    /// Issues a fresh pair if the refresh token is valid and its user still exists
    pub async fn refresh_token(&self, token: &str) -> Result<AuthResponse, AuthError> {
        let decoded = self.token_service.decode_refresh_jwt(token)?;
        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AuthError::InvalidUserId)?;

        let user = self.user_repo.get_user_by_id(&user_id)
            .await
            .map_err(|e| {
                tracing::error!("User lookup failed during token refresh: {}", e);
                AuthError::StoreUnavailable
            })?
            .ok_or(AuthError::WrongCredentials)?;

        self.create_auth_response(&user)
    }

    /// Resolves the principal behind a session token.
    pub fn resolve_principal(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.token_service.decode_jwt(token)?.claims;
        Principal::try_from(claims)
    }
}
