//! Infrastructure layer: account and listing storage plus the credential store.
//!
//! In-memory stores back development and tests; Postgres stores are compiled
//! with the `postgres` feature.

pub mod credentials;
pub mod error;
pub mod store;

pub use credentials::{CredentialError, CredentialStore};
pub use error::StoreError;
pub use store::{InMemoryPropertyStore, InMemoryUserStore, Mutation, PropertyStore, UserStore};

#[cfg(feature = "postgres")]
pub use store::postgres::{PostgresPropertyStore, PostgresUserStore, ensure_schema};
