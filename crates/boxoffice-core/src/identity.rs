//! Gateway-injected identity headers extractor.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-boxoffice-user-id";
pub const USER_ROLE_HEADER: &str = "x-boxoffice-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Buyer,
    /// Box-office staff: payment callbacks, refunds, check-in scanners.
    Staff,
}

impl Role {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Buyer),
            1 => Some(Self::Staff),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Buyer => 0,
            Self::Staff => 1,
        }
    }
}

/// Caller identity from `x-boxoffice-user-id` and `x-boxoffice-user-role`.
///
/// Rejects with 401 if either header is absent or malformed. Role checks
/// (403) are left to handlers.
#[derive(Debug, Clone, Copy)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
    pub role: Role,
}

impl IdentityHeaders {
    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// Owners and staff may act on a buyer's resources.
    pub fn may_access(&self, owner: Uuid) -> bool {
        self.is_staff() || self.user_id == owner
    }
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Values are read synchronously so the returned future is 'static.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Uuid>().ok());

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u8>().ok())
            .and_then(Role::from_code);

        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            let role = role.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { user_id, role })
        }
    }
}
