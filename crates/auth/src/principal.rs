use serde::{Deserialize, Serialize};

use roomshare_core::UserId;

use crate::UserType;

/// The authenticated identity behind a request.
///
/// Built from a verified session plus the user's stored role; the guard never
/// trusts a role carried by the client.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub user_type: UserType,
}

impl Actor {
    pub fn new(user_id: UserId, user_type: UserType) -> Self {
        Self { user_id, user_type }
    }
}
