//! Authorization guard for listing and account mutations.
//!
//! - No IO
//! - No panics
//! - Rules are evaluated in a fixed order, so the same request always fails
//!   with the same error.

use thiserror::Error;

use roomshare_core::UserId;

use crate::{Actor, password};

/// Keys a property update payload may carry.
pub const PROPERTY_UPDATE_FIELDS: &[&str] = &[
    "title",
    "description",
    "address",
    "propertyType",
    "totalRooms",
    "availableRooms",
    "bathrooms",
    "totalArea",
    "rent",
    "deposit",
    "utilities",
    "amenities",
    "rules",
    "images",
    "virtualTourUrl",
    "availableFrom",
    "leaseDuration",
    "isActive",
];

/// Keys a profile update payload may carry.
pub const PROFILE_UPDATE_FIELDS: &[&str] = &[
    "firstName",
    "lastName",
    "phone",
    "dateOfBirth",
    "gender",
    "bio",
    "occupation",
    "university",
    "lifestyle",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Forbidden: role not permitted")]
    RoleNotPermitted,

    #[error("Forbidden: not owner")]
    NotOwner,

    /// The payload carried keys outside the allow-list.
    #[error("Invalid updates")]
    InvalidUpdates { rejected: Vec<String> },

    #[error("Invalid current password")]
    InvalidCurrentPassword,
}

impl AuthzError {
    /// Role and ownership denials (HTTP 403).
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthzError::RoleNotPermitted | AuthzError::NotOwner)
    }
}

/// A mutation on a property listing.
///
/// Update and delete carry the landlord stored on the record, which the caller
/// must have fetched before asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAction {
    Create,
    Update { landlord: UserId },
    Delete { landlord: UserId },
}

/// Rule 1: every mutation needs a verified session.
pub fn require_session(actor: Option<&Actor>) -> Result<&Actor, AuthzError> {
    actor.ok_or(AuthzError::Unauthenticated)
}

/// Decide whether `actor` may perform `action`.
///
/// Creation is gated on role; update and delete are gated on ownership alone,
/// so a `both` user is still refused on someone else's listing.
pub fn authorize_property(actor: Option<&Actor>, action: PropertyAction) -> Result<Actor, AuthzError> {
    let actor = *require_session(actor)?;

    match action {
        PropertyAction::Create => {
            if !actor.user_type.can_list_properties() {
                return Err(AuthzError::RoleNotPermitted);
            }
        }
        PropertyAction::Update { landlord } | PropertyAction::Delete { landlord } => {
            if actor.user_id != landlord {
                return Err(AuthzError::NotOwner);
            }
        }
    }

    Ok(actor)
}

/// Reject the whole payload when any key falls outside `allowed`.
pub fn ensure_allowed_keys<'a>(
    keys: impl IntoIterator<Item = &'a str>,
    allowed: &[&str],
) -> Result<(), AuthzError> {
    let rejected: Vec<String> = keys
        .into_iter()
        .filter(|k| !allowed.contains(k))
        .map(str::to_string)
        .collect();

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(AuthzError::InvalidUpdates { rejected })
    }
}

/// Rule 7: a password change must re-prove the current password.
///
/// Uses the same comparison as login. A stored hash that cannot be parsed is
/// logged and reported as a mismatch.
pub fn authorize_password_change(current_password: &str, stored_hash: &str) -> Result<(), AuthzError> {
    match password::verify_password(current_password, stored_hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthzError::InvalidCurrentPassword),
        Err(e) => {
            tracing::error!(error = %e, "stored password hash could not be parsed");
            Err(AuthzError::InvalidCurrentPassword)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserType;
    use proptest::prelude::*;

    fn actor(user_type: UserType) -> Actor {
        Actor::new(UserId::new(), user_type)
    }

    #[test]
    fn missing_session_is_unauthenticated_for_every_action() {
        let owner = UserId::new();
        for action in [
            PropertyAction::Create,
            PropertyAction::Update { landlord: owner },
            PropertyAction::Delete { landlord: owner },
        ] {
            assert_eq!(authorize_property(None, action), Err(AuthzError::Unauthenticated));
        }
    }

    #[test]
    fn tenant_cannot_create() {
        let tenant = actor(UserType::Tenant);
        assert_eq!(
            authorize_property(Some(&tenant), PropertyAction::Create),
            Err(AuthzError::RoleNotPermitted)
        );
    }

    #[test]
    fn landlord_and_both_can_create() {
        for user_type in [UserType::Landlord, UserType::Both] {
            let a = actor(user_type);
            assert_eq!(authorize_property(Some(&a), PropertyAction::Create), Ok(a));
        }
    }

    #[test]
    fn owner_may_update_and_delete_even_as_tenant() {
        // Ownership, not role, decides: a landlord who later became a tenant
        // still controls their own listings.
        let owner = actor(UserType::Tenant);
        let landlord = owner.user_id;
        assert!(authorize_property(Some(&owner), PropertyAction::Update { landlord }).is_ok());
        assert!(authorize_property(Some(&owner), PropertyAction::Delete { landlord }).is_ok());
    }

    #[test]
    fn allowed_keys_pass() {
        assert_eq!(
            ensure_allowed_keys(["title", "rent", "rules"], PROPERTY_UPDATE_FIELDS),
            Ok(())
        );
    }

    #[test]
    fn one_unknown_key_rejects_the_whole_update() {
        let err = ensure_allowed_keys(["title", "landlord", "views"], PROPERTY_UPDATE_FIELDS).unwrap_err();
        assert_eq!(
            err,
            AuthzError::InvalidUpdates {
                rejected: vec!["landlord".to_string(), "views".to_string()]
            }
        );
        assert_eq!(err.to_string(), "Invalid updates");
    }

    #[test]
    fn profile_allow_list_excludes_account_fields() {
        for key in ["email", "password", "userType", "isActive", "profilePicture"] {
            assert!(ensure_allowed_keys([key], PROFILE_UPDATE_FIELDS).is_err(), "{key}");
        }
    }

    #[test]
    fn password_change_requires_current_password() {
        let hash = password::hash_password("old-secret").unwrap();
        assert_eq!(authorize_password_change("old-secret", &hash), Ok(()));
        assert_eq!(
            authorize_password_change("wrong", &hash),
            Err(AuthzError::InvalidCurrentPassword)
        );
        assert_eq!(
            authorize_password_change("old-secret", "garbage"),
            Err(AuthzError::InvalidCurrentPassword)
        );
    }

    fn any_user_type() -> impl Strategy<Value = UserType> {
        prop_oneof![Just(UserType::Tenant), Just(UserType::Landlord), Just(UserType::Both)]
    }

    proptest! {
        /// Property: a non-owner is refused on update/delete whatever their role.
        #[test]
        fn non_owner_is_always_forbidden(user_type in any_user_type(), delete in any::<bool>()) {
            let a = actor(user_type);
            let landlord = UserId::new();
            let action = if delete {
                PropertyAction::Delete { landlord }
            } else {
                PropertyAction::Update { landlord }
            };
            prop_assert_eq!(authorize_property(Some(&a), action), Err(AuthzError::NotOwner));
        }
    }
}
