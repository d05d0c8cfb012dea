use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use roomshare_auth::User;
use roomshare_auth::user::normalize_email;
use roomshare_core::{PropertyId, UserId};
use roomshare_listings::{LandlordStats, ListingPage, ListingQuery, ListingStats, Property};

use super::{Mutation, PropertyStore, UserStore};
use crate::StoreError;

/// Run `mutation` on a copy of `record` and commit it only on success.
fn apply_to_copy<T: Clone>(record: &mut T, mutation: Mutation<T>) -> Result<T, StoreError> {
    let mut working = record.clone();
    mutation(&mut working)?;
    *record = working.clone();
    Ok(working)
}

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        let email = normalize_email(&user.email);
        if map.values().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        map.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        let map = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: UserId, mutation: Mutation<User>) -> Result<User, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        let user = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        apply_to_copy(user, mutation)
    }
}

/// In-memory listing store for tests/dev. Queries are evaluated by
/// [`ListingQuery::paginate`].
#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    inner: RwLock<HashMap<PropertyId, Property>>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn insert(&self, property: Property) -> Result<Property, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        map.insert(property.id, property.clone());
        Ok(property)
    }

    async fn get(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn record_view(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        match map.get_mut(&id) {
            Some(p) if p.is_active => {
                p.record_view();
                Ok(Some(p.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update(&self, id: PropertyId, mutation: Mutation<Property>) -> Result<Property, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        let property = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        apply_to_copy(property, mutation)
    }

    async fn delete(&self, id: PropertyId) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        Ok(map.remove(&id).is_some())
    }

    async fn query(&self, query: &ListingQuery) -> Result<ListingPage, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(query.paginate(map.values().cloned()))
    }

    async fn listing_stats(&self) -> Result<ListingStats, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(ListingStats::summarize(map.values()))
    }

    async fn landlord_stats(&self, landlord: UserId) -> Result<LandlordStats, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(LandlordStats::summarize(map.values().filter(|p| p.landlord == landlord)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use roomshare_auth::NewUser;
    use roomshare_core::{DomainError, ValidationErrors};
    use roomshare_listings::{Address, NewProperty, PropertyPatch, PropertyType};
    use std::sync::Arc;

    fn user(email: &str) -> User {
        let new = NewUser {
            first_name: "Asha".to_string(),
            last_name: "Gurung".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            user_type: None,
        };
        User::register(new, "hash".to_string(), Utc::now())
    }

    fn property(landlord: UserId) -> Property {
        NewProperty {
            title: "Room in Patan".to_string(),
            description: "A quiet room close to Patan Durbar Square.".to_string(),
            address: Address {
                street: "Mangal Bazaar".to_string(),
                city: "Lalitpur".to_string(),
                state: "Bagmati".to_string(),
                zip_code: "44700".to_string(),
                ..Address::default()
            },
            property_type: Some(PropertyType::Room),
            total_rooms: Some(2),
            available_rooms: Some(1),
            bathrooms: Some(1),
            rent: Some(15_000.0),
            deposit: Some(15_000.0),
            available_from: Some("2024-01-01".to_string()),
            ..NewProperty::default()
        }
        .into_property(landlord, Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_differing_by_case_is_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(user("asha@example.com")).await.unwrap();
        let err = store.insert(user("  ASHA@Example.com ")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn find_by_email_ignores_case() {
        let store = InMemoryUserStore::new();
        let u = store.insert(user("asha@example.com")).await.unwrap();
        let found = store.find_by_email("Asha@Example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, u.id);
    }

    #[tokio::test]
    async fn rejected_mutation_leaves_record_unchanged() {
        let store = InMemoryUserStore::new();
        let u = store.insert(user("asha@example.com")).await.unwrap();
        let err = store
            .update(
                u.id,
                Box::new(|u: &mut User| -> Result<(), StoreError> {
                    u.first_name = "Changed".to_string();
                    Err(StoreError::Rejected(DomainError::from(ValidationErrors::single("firstName", "nope"))))
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(store.get(u.id).await.unwrap().unwrap().first_name, "Asha");
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = InMemoryPropertyStore::new();
        let err = store
            .update(PropertyId::new(), Box::new(|_: &mut Property| Ok::<(), StoreError>(())))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn views_count_every_concurrent_read() {
        let store = Arc::new(InMemoryPropertyStore::new());
        let p = store.insert(property(UserId::new())).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..25 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.record_view(p.id).await }));
        }
        for h in handles {
            assert!(h.await.unwrap().unwrap().is_some());
        }
        assert_eq!(store.get(p.id).await.unwrap().unwrap().views, 25);
    }

    #[tokio::test]
    async fn inactive_listing_views_are_not_counted() {
        let store = InMemoryPropertyStore::new();
        let mut p = property(UserId::new());
        p.is_active = false;
        let p = store.insert(p).await.unwrap();
        assert!(store.record_view(p.id).await.unwrap().is_none());
        assert_eq!(store.get(p.id).await.unwrap().unwrap().views, 0);
    }

    #[tokio::test]
    async fn list_does_not_touch_views() {
        let store = InMemoryPropertyStore::new();
        let p = store.insert(property(UserId::new())).await.unwrap();
        let page = store.query(&ListingQuery::default()).await.unwrap();
        assert_eq!(page.properties.len(), 1);
        assert_eq!(store.get(p.id).await.unwrap().unwrap().views, 0);
    }

    #[tokio::test]
    async fn patch_through_store_keeps_clamp() {
        let store = InMemoryPropertyStore::new();
        let p = store.insert(property(UserId::new())).await.unwrap();
        let patch = PropertyPatch {
            available_rooms: Some(9),
            ..PropertyPatch::default()
        };
        let updated = store
            .update(
                p.id,
                Box::new(move |p: &mut Property| patch.apply(p, Utc::now()).map_err(StoreError::from)),
            )
            .await
            .unwrap();
        assert_eq!(updated.available_rooms, updated.total_rooms);
    }

    #[tokio::test]
    async fn landlord_stats_are_scoped() {
        let store = InMemoryPropertyStore::new();
        let owner = UserId::new();
        store.insert(property(owner)).await.unwrap();
        store.insert(property(owner)).await.unwrap();
        store.insert(property(UserId::new())).await.unwrap();
        let stats = store.landlord_stats(owner).await.unwrap();
        assert_eq!(stats.total_properties, 2);
        assert_eq!(store.listing_stats().await.unwrap().general.total_properties, 3);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryPropertyStore::new();
        let p = store.insert(property(UserId::new())).await.unwrap();
        assert!(store.delete(p.id).await.unwrap());
        assert!(!store.delete(p.id).await.unwrap());
        assert!(store.get(p.id).await.unwrap().is_none());
    }
}
