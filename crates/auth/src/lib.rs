//! `roomshare-auth`: authentication and authorization boundary.
//!
//! Session tokens, password hashing, the user account model and the
//! authorization guard for listing and account mutations. This crate is
//! intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{
    AuthzError, PropertyAction, authorize_password_change, authorize_property, ensure_allowed_keys,
    require_session,
    PROFILE_UPDATE_FIELDS, PROPERTY_UPDATE_FIELDS,
};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use principal::Actor;
pub use roles::UserType;
pub use session::{
    Hs256SessionIssuer, IssuedSession, SessionError, SessionIssuer, default_session_ttl, parse_expiry,
};
pub use user::{Gender, Lifestyle, LifestylePatch, NewUser, ProfilePatch, User};
