use uuid::Uuid;

use crate::{entities::token::Principal, errors::AppError};

/// Stateless authorization rules evaluated per request.
///
/// Exactly one account is privileged: the one whose email matches
/// `admin_email` byte for byte. Nothing in the API can grant that status.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    admin_email: String,
}

impl AccessPolicy {
    pub fn new(admin_email: impl Into<String>) -> Self {
        AccessPolicy { admin_email: admin_email.into() }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        !self.admin_email.is_empty() && email == self.admin_email
    }

    pub fn is_admin(&self, principal: &Principal) -> bool {
        self.is_admin_email(&principal.email)
    }

    pub fn ensure_admin(&self, principal: &Principal) -> Result<(), AppError> {
        if self.is_admin(principal) {
            Ok(())
        } else {
            Err(AppError::ForbiddenAccess)
        }
    }

    /// Owner-only check. Administrators get no override here.
    pub fn ensure_owner(&self, principal: &Principal, owner_id: &Uuid) -> Result<(), AppError> {
        if principal.id == *owner_id {
            Ok(())
        } else {
            Err(AppError::ForbiddenAccess)
        }
    }
}
