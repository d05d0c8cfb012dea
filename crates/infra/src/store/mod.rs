//! Account and listing storage abstractions.
//!
//! Every read-modify-write on a single record goes through `update`, which
//! runs the mutation against the current record atomically: the record cannot
//! change between the read and the write, and a rejected mutation leaves it
//! untouched.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;

use roomshare_auth::User;
use roomshare_core::{PropertyId, UserId};
use roomshare_listings::{LandlordStats, ListingPage, ListingQuery, ListingStats, Property};

use crate::StoreError;

pub use in_memory::{InMemoryPropertyStore, InMemoryUserStore};

/// A change applied to one record inside the store's critical section.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) -> Result<(), StoreError> + Send>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` when the
    /// case-insensitive email is taken.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Look up by email, ignoring case and surrounding whitespace.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Apply `mutation` atomically and return the stored result.
    async fn update(&self, id: UserId, mutation: Mutation<User>) -> Result<User, StoreError>;
}

#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn insert(&self, property: Property) -> Result<Property, StoreError>;

    async fn get(&self, id: PropertyId) -> Result<Option<Property>, StoreError>;

    /// Increment the view counter of an active listing and return it.
    /// Inactive or missing listings yield `None` and are not counted.
    async fn record_view(&self, id: PropertyId) -> Result<Option<Property>, StoreError>;

    /// Apply `mutation` atomically and return the stored result.
    async fn update(&self, id: PropertyId, mutation: Mutation<Property>) -> Result<Property, StoreError>;

    /// Hard delete. Returns whether a record was removed.
    async fn delete(&self, id: PropertyId) -> Result<bool, StoreError>;

    async fn query(&self, query: &ListingQuery) -> Result<ListingPage, StoreError>;

    async fn listing_stats(&self) -> Result<ListingStats, StoreError>;

    async fn landlord_stats(&self, landlord: UserId) -> Result<LandlordStats, StoreError>;
}
