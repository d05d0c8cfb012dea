//! `roomshare-core`: shared domain primitives.
//!
//! Identifiers, the field-level validation model and the domain error type.
//! Nothing in here knows about HTTP or storage.

pub mod error;
pub mod id;
pub mod validation;

pub use error::DomainError;
pub use id::{PropertyId, UserId};
pub use validation::{FieldError, ValidationErrors};
