use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{entities::token::Principal, errors::AppError, AppState};

/// Extractor for the authenticated principal attached by the session middleware.
/// Returns 401 if the request is anonymous.
/// Usage: Add `user: CurrentUser` as a parameter to your handler function.
#[derive(Debug)]
pub struct CurrentUser(pub Principal);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Principal>() {
            Some(principal) => ready(Ok(CurrentUser(principal.clone()))),
            None => ready(Err(AppError::UnauthorizedAccess)),
        }
    }
}

/// Extractor for the administrator.
/// Returns 401 if the request is anonymous, 403 if the principal is not the admin.
#[derive(Debug)]
pub struct AdminUser(pub Principal);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let Some(principal) = req.extensions().get::<Principal>().cloned() else {
            return ready(Err(AppError::UnauthorizedAccess));
        };

        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState missing in AdminUser extractor");
            return ready(Err(AppError::InternalError("Application state unavailable".into())));
        };

        ready(state.access_policy.ensure_admin(&principal).map(|_| AdminUser(principal)))
    }
}
