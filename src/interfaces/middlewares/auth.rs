use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{constants::ADMIN_PREFIX, entities::token::Principal, errors::AppError, AppState};

/// Resolves the bearer token once per request.
///
/// A missing, expired or malformed token leaves the request anonymous, so
/// login, refresh and public reads work with a stale header. Handlers that
/// need a principal reject anonymous requests through `CurrentUser`.
/// Admin paths additionally require the administrator principal.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return service.call(req).await;
            }

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing in middleware");
                return Ok(error_response(req, AppError::InternalError("Application state unavailable".into())));
            };

            let principal = extract_token(&req).and_then(|token| {
                state
                    .auth_handler
                    .resolve_principal(&token)
                    .map_err(|e| tracing::debug!("Ignoring unusable session token on {}: {}", req.path(), e))
                    .ok()
            });

            if let Err(e) = enforce_admin_access(req.path(), principal.as_ref(), &state) {
                return Ok(error_response(req, e));
            }

            if let Some(principal) = principal {
                req.extensions_mut().insert(principal);
            }
            service.call(req).await
        })
    }
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

fn enforce_admin_access(path: &str, principal: Option<&Principal>, state: &AppState) -> Result<(), AppError> {
    if !is_admin_path(path) {
        return Ok(());
    }

    match principal {
        None => Err(AppError::UnauthorizedAccess),
        Some(p) if !state.access_policy.is_admin(p) => {
            tracing::warn!(user = %p.id, "Admin access required for path: {}", path);
            Err(AppError::ForbiddenAccess)
        }
        Some(_) => Ok(()),
    }
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with(&format!("{}/", ADMIN_PREFIX))
}

fn error_response(req: ServiceRequest, error: AppError) -> ServiceResponse<BoxBody> {
    req.into_response(error.error_response())
}
