use axum::{
    async_trait,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize, Serializer, de::DeserializeOwned, ser::Error as _};
use serde_json::Value;

use roomshare_auth::{User, ensure_allowed_keys};
use roomshare_core::UserId;
use roomshare_listings::{LandlordStats, ListingFilter, Pagination, Property, StatusFilter};

use crate::app::errors::ApiError;

// -------------------------
// Extractors
// -------------------------

/// `Json<T>` whose rejection is reported in the response envelope.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => ApiError::bad_request(format!("Invalid request body: {}", e.body_text())),
        JsonRejection::JsonSyntaxError(_) => ApiError::bad_request("Malformed JSON body"),
        JsonRejection::MissingJsonContentType(_) => ApiError::bad_request("Expected a JSON body"),
        other => ApiError::bad_request(other.body_text()),
    }
}

/// Decode an update payload after checking its keys against `allowed`.
///
/// Any key outside the allow-list rejects the whole payload before the typed
/// decode runs.
pub fn decode_patch<T: DeserializeOwned>(body: Value, allowed: &[&str]) -> Result<T, ApiError> {
    let Value::Object(map) = &body else {
        return Err(ApiError::bad_request("Request body must be a JSON object"));
    };
    ensure_allowed_keys(map.keys().map(String::as_str), allowed)?;
    serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid updates: {e}")))
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePictureRequest {
    pub profile_picture: Option<String>,
}

/// Paging parameters kept as text; bad values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    /// Last value wins for a repeated key.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let last = |name: &str| pairs.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v.clone());
        Self {
            page: last("page"),
            limit: last("limit"),
        }
    }

    pub fn page_request(&self) -> roomshare_listings::PageRequest {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|s| s.trim().parse().ok());
        roomshare_listings::PageRequest::new(parse(&self.page), parse(&self.limit))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MyPropertiesParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

impl MyPropertiesParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let PageParams { page, limit } = PageParams::from_pairs(pairs);
        let status = pairs.iter().rev().find(|(k, _)| k == "status").map(|(_, v)| v.clone());
        Self { page, limit, status }
    }

    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page.clone(),
            limit: self.limit.clone(),
        }
    }

    pub fn status(&self) -> StatusFilter {
        self.status
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Public account view with the derived display name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    pub full_name: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name(),
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserView,
    pub token: String,
}

impl AuthPayload {
    pub fn new(user: User, token: String) -> Self {
        Self { user: user.into(), token }
    }
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: UserView,
}

impl UserPayload {
    pub fn new(user: User) -> Self {
        Self { user: user.into() }
    }
}

/// Landlord contact details embedded in property reads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl LandlordSummary {
    /// Contact card used in listings.
    pub fn of(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            average_rating: user.average_rating,
            total_reviews: user.total_reviews,
            profile_picture: user.profile_picture.clone(),
            bio: None,
        }
    }

    /// Contact card for the single-property read, which also carries the bio.
    pub fn detailed(user: &User) -> Self {
        Self {
            bio: user.bio.clone(),
            ..Self::of(user)
        }
    }
}

/// A property as returned to clients.
///
/// Adds `fullAddress`, and replaces the `landlord` id with the contact card
/// when one was resolved. The stored record is left untouched.
#[derive(Debug, Clone)]
pub struct PropertyView {
    pub property: Property,
    pub landlord: Option<LandlordSummary>,
}

impl From<Property> for PropertyView {
    fn from(property: Property) -> Self {
        Self { property, landlord: None }
    }
}

impl Serialize for PropertyView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.property).map_err(S::Error::custom)?;
        if let Value::Object(map) = &mut value {
            map.insert("fullAddress".to_string(), Value::String(self.property.address.full()));
            if let Some(landlord) = &self.landlord {
                let card = serde_json::to_value(landlord).map_err(S::Error::custom)?;
                map.insert("landlord".to_string(), card);
            }
        }
        value.serialize(serializer)
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyPayload {
    pub property: PropertyView,
}

#[derive(Debug, Serialize)]
pub struct ListingPayload {
    pub properties: Vec<PropertyView>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct MyPropertiesPayload {
    pub properties: Vec<PropertyView>,
    pub pagination: Pagination,
    pub stats: LandlordStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPayload {
    pub properties: Vec<PropertyView>,
    pub pagination: Pagination,
    pub applied_filters: ListingFilter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use roomshare_auth::{NewUser, PROFILE_UPDATE_FIELDS, ProfilePatch};
    use roomshare_listings::{Address, NewProperty, PropertyType};
    use serde_json::json;

    #[test]
    fn patch_with_unknown_key_is_rejected_whole() {
        let err = decode_patch::<ProfilePatch>(json!({"bio": "hi", "email": "x@y.z"}), PROFILE_UPDATE_FIELDS)
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn patch_must_be_an_object() {
        assert!(decode_patch::<ProfilePatch>(json!(["bio"]), PROFILE_UPDATE_FIELDS).is_err());
    }

    #[test]
    fn allowed_keys_decode() {
        let patch: ProfilePatch = decode_patch(json!({"bio": "hi"}), PROFILE_UPDATE_FIELDS).unwrap();
        assert_eq!(patch.bio.as_deref(), Some("hi"));
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn repeated_paging_keys_keep_the_last_value() {
        let params = MyPropertiesParams::from_pairs(&pairs(&[
            ("page", "1"),
            ("page", "3"),
            ("status", "inactive"),
            ("status", "active"),
        ]));
        assert_eq!(params.page_params().page_request().page(), 3);
        assert_eq!(params.status(), StatusFilter::Active);
    }

    fn account(first: &str, last: &str, email: &str) -> User {
        User::register(
            NewUser {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: email.to_string(),
                ..NewUser::default()
            },
            "stored-hash".to_string(),
            Utc::now(),
        )
    }

    fn listing(landlord: UserId) -> Property {
        NewProperty {
            title: "Room by the lake".to_string(),
            description: "Quiet furnished room with a shared kitchen.".to_string(),
            address: Address {
                street: "4 Lakeside Road".to_string(),
                city: "Pokhara".to_string(),
                state: "Gandaki".to_string(),
                zip_code: "33700".to_string(),
                ..Address::default()
            },
            property_type: Some(PropertyType::Room),
            total_rooms: Some(2),
            available_rooms: Some(1),
            bathrooms: Some(1),
            rent: Some(15_000.0),
            deposit: Some(30_000.0),
            available_from: Some("2024-06-01".to_string()),
            ..NewProperty::default()
        }
        .into_property(landlord, Utc::now())
        .unwrap()
    }

    #[test]
    fn property_view_adds_full_address_and_landlord_card() {
        let mut owner = account("Sita", "Rai", "sita@example.com");
        owner.bio = Some("Lives upstairs".to_string());
        let property = listing(owner.id);

        let bare = serde_json::to_value(PropertyView::from(property.clone())).unwrap();
        assert_eq!(bare["fullAddress"], "4 Lakeside Road, Pokhara, Gandaki 33700");
        assert_eq!(bare["landlord"], json!(owner.id));

        let listed = PropertyView { property: property.clone(), landlord: Some(LandlordSummary::of(&owner)) };
        let listed = serde_json::to_value(listed).unwrap();
        assert_eq!(listed["landlord"]["fullName"], "Sita Rai");
        assert_eq!(listed["landlord"]["email"], "sita@example.com");
        assert!(listed["landlord"].get("bio").is_none());

        let detail = PropertyView { property, landlord: Some(LandlordSummary::detailed(&owner)) };
        let detail = serde_json::to_value(detail).unwrap();
        assert_eq!(detail["landlord"]["bio"], "Lives upstairs");
    }

    #[test]
    fn user_view_carries_full_name_without_hash() {
        let value = serde_json::to_value(UserView::from(account("Hari", "Thapa", "hari@example.com"))).unwrap();
        assert_eq!(value["fullName"], "Hari Thapa");
        assert_eq!(value["firstName"], "Hari");
        assert!(value.get("passwordHash").is_none());
    }

    #[test]
    fn status_filter_is_lenient() {
        let params = MyPropertiesParams { status: Some("bogus".to_string()), ..Default::default() };
        assert_eq!(params.status(), StatusFilter::All);
    }
}
