//! Gateway identity headers for tests.
//!
//! Services behind the gateway receive `x-boxoffice-user-id` and
//! `x-boxoffice-user-role`. `MockAuth` produces them directly so no gateway
//! is needed.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use boxoffice_core::identity::{Role, USER_ID_HEADER, USER_ROLE_HEADER};

pub struct MockAuth {
    pub user_id: Uuid,
    pub role: Role,
}

impl MockAuth {
    pub fn buyer(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Buyer,
        }
    }

    pub fn staff() -> Self {
        Self {
            user_id: Uuid::new_v4(),
            role: Role::Staff,
        }
    }

    /// Header pairs as the gateway would inject them.
    pub fn header_pairs(&self) -> [(HeaderName, HeaderValue); 2] {
        [
            (
                HeaderName::from_static(USER_ID_HEADER),
                HeaderValue::from_str(&self.user_id.to_string()).unwrap(),
            ),
            (
                HeaderName::from_static(USER_ROLE_HEADER),
                HeaderValue::from(u16::from(self.role.code())),
            ),
        ]
    }

    pub fn headers(&self) -> HeaderMap {
        self.header_pairs().into_iter().collect()
    }
}
