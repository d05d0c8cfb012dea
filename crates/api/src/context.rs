use roomshare_auth::{Actor, User};

/// Verified session for a request.
///
/// Present only when the bearer token verified and its user still exists and
/// is active. Handlers that require a session take it as an `Option` and
/// reject `None` with `Unauthenticated`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalContext {
    user: User,
}

impl PrincipalContext {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.user.id, self.user.user_type)
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}
