use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use roomshare_core::{PropertyId, UserId, ValidationErrors};

static IMAGE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://.+\.(jpg|jpeg|png|webp)$").expect("image url regex is valid")
});

pub const DEFAULT_COUNTRY: &str = "Nepal";

// ─────────────────────────────────────────────────────────────────────────────
// Enumerations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Condo,
    Studio,
    Room,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Condo => "condo",
            PropertyType::Studio => "studio",
            PropertyType::Room => "room",
        }
    }
}

impl core::str::FromStr for PropertyType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apartment" => Ok(PropertyType::Apartment),
            "house" => Ok(PropertyType::House),
            "condo" => Ok(PropertyType::Condo),
            "studio" => Ok(PropertyType::Studio),
            "room" => Ok(PropertyType::Room),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Amenity {
    Wifi,
    Parking,
    Laundry,
    Gym,
    Pool,
    Ac,
    Heating,
    Furnished,
    Kitchen,
    Balcony,
    Elevator,
    Security,
    Garden,
    Rooftop,
}

impl Amenity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Amenity::Wifi => "wifi",
            Amenity::Parking => "parking",
            Amenity::Laundry => "laundry",
            Amenity::Gym => "gym",
            Amenity::Pool => "pool",
            Amenity::Ac => "ac",
            Amenity::Heating => "heating",
            Amenity::Furnished => "furnished",
            Amenity::Kitchen => "kitchen",
            Amenity::Balcony => "balcony",
            Amenity::Elevator => "elevator",
            Amenity::Security => "security",
            Amenity::Garden => "garden",
            Amenity::Rooftop => "rooftop",
        }
    }
}

impl core::str::FromStr for Amenity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "wifi" => Amenity::Wifi,
            "parking" => Amenity::Parking,
            "laundry" => Amenity::Laundry,
            "gym" => Amenity::Gym,
            "pool" => Amenity::Pool,
            "ac" => Amenity::Ac,
            "heating" => Amenity::Heating,
            "furnished" => Amenity::Furnished,
            "kitchen" => Amenity::Kitchen,
            "balcony" => Amenity::Balcony,
            "elevator" => Amenity::Elevator,
            "security" => Amenity::Security,
            "garden" => Amenity::Garden,
            "rooftop" => Amenity::Rooftop,
            _ => return Err(()),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseDuration {
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
    #[default]
    #[serde(rename = "flexible")]
    Flexible,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    #[default]
    Any,
    Male,
    Female,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sub-documents
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

impl Default for Address {
    fn default() -> Self {
        Self {
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: default_country(),
            coordinates: None,
        }
    }
}

impl Address {
    pub fn full(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Utilities {
    pub included: bool,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rules {
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub parties_allowed: bool,
    pub gender_preference: GenderPreference,
    pub max_occupants: Option<u32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Property
// ─────────────────────────────────────────────────────────────────────────────

/// A rental listing.
///
/// # Invariants
/// - `available_rooms <= total_rooms` after every write (clamped, not rejected).
/// - `landlord` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub address: Address,
    pub property_type: PropertyType,
    pub total_rooms: u32,
    pub available_rooms: u32,
    pub bathrooms: u32,
    pub total_area: Option<f64>,
    pub rent: f64,
    pub deposit: f64,
    pub utilities: Utilities,
    pub amenities: Vec<Amenity>,
    pub rules: Rules,
    pub images: Vec<String>,
    pub virtual_tour_url: Option<String>,
    pub landlord: UserId,
    pub is_active: bool,
    pub available_from: DateTime<Utc>,
    pub lease_duration: LeaseDuration,
    pub views: u64,
    pub average_rating: f64,
    pub total_reviews: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Clamp available rooms to the total. Runs on every write path.
    pub fn enforce_room_invariant(&mut self) {
        if self.available_rooms > self.total_rooms {
            self.available_rooms = self.total_rooms;
        }
    }

    /// Whether anonymous visitors may see this listing in list/search results.
    pub fn is_publicly_listed(&self) -> bool {
        self.is_active && self.available_rooms > 0
    }

    /// Validate the whole record against the field constraint table.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("title", &self.title, 5, 100, "Title must be between 5 and 100 characters");
        errors.check_length(
            "description",
            &self.description,
            20,
            1000,
            "Description must be between 20 and 1000 characters",
        );
        errors.extend(validate_address(&self.address));
        errors.check_min_u32("totalRooms", self.total_rooms, 1, "Total rooms must be at least 1");
        errors.check_min_u32("bathrooms", self.bathrooms, 1, "Bathrooms must be at least 1");
        if let Some(area) = self.total_area {
            errors.check_min_f64("totalArea", area, 0.0, "Total area cannot be negative");
        }
        errors.check_min_f64("rent", self.rent, 0.0, "Rent must be a positive number");
        errors.check_min_f64("deposit", self.deposit, 0.0, "Deposit must be a positive number");
        errors.check_min_f64("utilities.cost", self.utilities.cost, 0.0, "Utility cost cannot be negative");
        if let Some(max) = self.rules.max_occupants {
            errors.check_min_u32("rules.maxOccupants", max, 1, "Max occupants must be at least 1");
        }
        for (i, url) in self.images.iter().enumerate() {
            if !IMAGE_URL_RE.is_match(url) {
                errors.push(format!("images[{i}]"), "Please provide a valid image URL");
            }
        }
        errors.finish(())
    }

    /// Increment the view counter. Stores call this inside their atomic update.
    pub fn record_view(&mut self) {
        self.views = self.views.saturating_add(1);
    }
}

fn validate_address(address: &Address) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check_not_blank("address.street", &address.street, "Street address is required");
    errors.check_not_blank("address.city", &address.city, "City is required");
    errors.check_not_blank("address.state", &address.state, "State is required");
    errors.check_not_blank("address.zipCode", &address.zip_code, "Zip code is required");
    errors.check_not_blank("address.country", &address.country, "Country is required");
    if let Some(c) = address.coordinates {
        if !(-90.0..=90.0).contains(&c.lat) || !(-180.0..=180.0).contains(&c.lng) {
            errors.push("address.coordinates", "Coordinates are out of range");
        }
    }
    errors
}

fn dedup_amenities(amenities: &mut Vec<Amenity>) {
    amenities.sort();
    amenities.dedup();
}

/// Parse an ISO-8601 date (`2024-05-01`) or RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// ─────────────────────────────────────────────────────────────────────────────
// Creation
// ─────────────────────────────────────────────────────────────────────────────

/// Listing creation input. Required fields are optional here so that a
/// missing field produces a field error instead of a decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub address: Address,
    pub property_type: Option<PropertyType>,
    pub total_rooms: Option<u32>,
    pub available_rooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub total_area: Option<f64>,
    pub rent: Option<f64>,
    pub deposit: Option<f64>,
    pub utilities: Utilities,
    pub amenities: Vec<Amenity>,
    pub rules: Rules,
    pub images: Vec<String>,
    pub virtual_tour_url: Option<String>,
    pub available_from: Option<String>,
    pub lease_duration: LeaseDuration,
}

impl NewProperty {
    /// Validate and build the stored record owned by `landlord`.
    pub fn into_property(self, landlord: UserId, now: DateTime<Utc>) -> Result<Property, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.property_type.is_none() {
            errors.push("propertyType", "Property type is required");
        }
        if self.total_rooms.is_none() {
            errors.push("totalRooms", "Total rooms is required");
        }
        if self.available_rooms.is_none() {
            errors.push("availableRooms", "Available rooms is required");
        }
        if self.bathrooms.is_none() {
            errors.push("bathrooms", "Number of bathrooms is required");
        }
        if self.rent.is_none() {
            errors.push("rent", "Rent amount is required");
        }
        if self.deposit.is_none() {
            errors.push("deposit", "Deposit amount is required");
        }
        let available_from = match self.available_from.as_deref() {
            None => {
                errors.push("availableFrom", "Available from date is required");
                None
            }
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    errors.push("availableFrom", "Available from must be a valid date");
                }
                parsed
            }
        };

        let mut property = Property {
            id: PropertyId::new(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            address: self.address,
            property_type: self.property_type.unwrap_or(PropertyType::Room),
            total_rooms: self.total_rooms.unwrap_or(0),
            available_rooms: self.available_rooms.unwrap_or(0),
            bathrooms: self.bathrooms.unwrap_or(0),
            total_area: self.total_area,
            rent: self.rent.unwrap_or(0.0),
            deposit: self.deposit.unwrap_or(0.0),
            utilities: self.utilities,
            amenities: self.amenities,
            rules: self.rules,
            images: self.images,
            virtual_tour_url: self.virtual_tour_url,
            landlord,
            is_active: true,
            available_from: available_from.unwrap_or(now),
            lease_duration: self.lease_duration,
            views: 0,
            average_rating: 0.0,
            total_reviews: 0,
            created_at: now,
            updated_at: now,
        };
        dedup_amenities(&mut property.amenities);
        property.enforce_room_invariant();

        // Skip the record-level "at least 1" message when the field was absent
        // and already reported as required.
        if let Err(record_errors) = property.validate() {
            for e in record_errors {
                if !errors.has_field(&e.field) {
                    errors.push(e.field, e.message);
                }
            }
        }

        errors.finish(property)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Patching
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressPatch {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UtilitiesPatch {
    pub included: Option<bool>,
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RulesPatch {
    pub pets_allowed: Option<bool>,
    pub smoking_allowed: Option<bool>,
    pub parties_allowed: Option<bool>,
    pub gender_preference: Option<GenderPreference>,
    pub max_occupants: Option<u32>,
}

/// Typed listing update.
///
/// Top-level key membership is checked against the guard's allow-list before
/// decoding; nested objects merge key-by-key into the stored sub-document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<AddressPatch>,
    pub property_type: Option<PropertyType>,
    pub total_rooms: Option<u32>,
    pub available_rooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub total_area: Option<f64>,
    pub rent: Option<f64>,
    pub deposit: Option<f64>,
    pub utilities: Option<UtilitiesPatch>,
    pub amenities: Option<Vec<Amenity>>,
    pub rules: Option<RulesPatch>,
    pub images: Option<Vec<String>>,
    pub virtual_tour_url: Option<String>,
    pub available_from: Option<String>,
    pub lease_duration: Option<LeaseDuration>,
    pub is_active: Option<bool>,
}

impl PropertyPatch {
    /// Apply onto `property`, clamp rooms and re-validate.
    ///
    /// On error `property` may be partially modified; stores apply patches to
    /// a working copy and discard it on failure.
    pub fn apply(&self, property: &mut Property, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(v) = &self.title {
            property.title = v.trim().to_string();
        }
        if let Some(v) = &self.description {
            property.description = v.trim().to_string();
        }
        if let Some(a) = &self.address {
            let target = &mut property.address;
            if let Some(v) = &a.street {
                target.street = v.clone();
            }
            if let Some(v) = &a.city {
                target.city = v.clone();
            }
            if let Some(v) = &a.state {
                target.state = v.clone();
            }
            if let Some(v) = &a.zip_code {
                target.zip_code = v.clone();
            }
            if let Some(v) = &a.country {
                target.country = v.clone();
            }
            if let Some(v) = a.coordinates {
                target.coordinates = Some(v);
            }
        }
        if let Some(v) = self.property_type {
            property.property_type = v;
        }
        if let Some(v) = self.total_rooms {
            property.total_rooms = v;
        }
        if let Some(v) = self.available_rooms {
            property.available_rooms = v;
        }
        if let Some(v) = self.bathrooms {
            property.bathrooms = v;
        }
        if let Some(v) = self.total_area {
            property.total_area = Some(v);
        }
        if let Some(v) = self.rent {
            property.rent = v;
        }
        if let Some(v) = self.deposit {
            property.deposit = v;
        }
        if let Some(u) = &self.utilities {
            if let Some(v) = u.included {
                property.utilities.included = v;
            }
            if let Some(v) = u.cost {
                property.utilities.cost = v;
            }
        }
        if let Some(v) = &self.amenities {
            property.amenities = v.clone();
            dedup_amenities(&mut property.amenities);
        }
        if let Some(r) = &self.rules {
            let target = &mut property.rules;
            if let Some(v) = r.pets_allowed {
                target.pets_allowed = v;
            }
            if let Some(v) = r.smoking_allowed {
                target.smoking_allowed = v;
            }
            if let Some(v) = r.parties_allowed {
                target.parties_allowed = v;
            }
            if let Some(v) = r.gender_preference {
                target.gender_preference = v;
            }
            if let Some(v) = r.max_occupants {
                target.max_occupants = Some(v);
            }
        }
        if let Some(v) = &self.images {
            property.images = v.clone();
        }
        if let Some(v) = &self.virtual_tour_url {
            property.virtual_tour_url = Some(v.clone());
        }
        if let Some(raw) = &self.available_from {
            match parse_date(raw) {
                Some(d) => property.available_from = d,
                None => errors.push("availableFrom", "Available from must be a valid date"),
            }
        }
        if let Some(v) = self.lease_duration {
            property.lease_duration = v;
        }
        if let Some(v) = self.is_active {
            property.is_active = v;
        }

        property.enforce_room_invariant();
        property.updated_at = now;

        if let Err(e) = property.validate() {
            errors.extend(e);
        }
        errors.finish(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn sample_new_property() -> NewProperty {
        NewProperty {
            title: "Sunny room near Thamel".to_string(),
            description: "Bright furnished room with shared kitchen and rooftop access.".to_string(),
            address: Address {
                street: "12 Jyatha Marg".to_string(),
                city: "Kathmandu".to_string(),
                state: "Bagmati".to_string(),
                zip_code: "44600".to_string(),
                ..Address::default()
            },
            property_type: Some(PropertyType::Room),
            total_rooms: Some(3),
            available_rooms: Some(2),
            bathrooms: Some(1),
            rent: Some(25_000.0),
            deposit: Some(50_000.0),
            amenities: vec![Amenity::Wifi, Amenity::Kitchen],
            available_from: Some("2024-06-01".to_string()),
            ..NewProperty::default()
        }
    }

    pub(crate) fn sample_property() -> Property {
        sample_new_property()
            .into_property(UserId::new(), Utc::now())
            .unwrap()
    }

    #[test]
    fn create_clamps_available_rooms_to_total() {
        let mut input = sample_new_property();
        input.total_rooms = Some(2);
        input.available_rooms = Some(5);

        let property = input.into_property(UserId::new(), Utc::now()).unwrap();
        assert_eq!(property.total_rooms, 2);
        assert_eq!(property.available_rooms, 2);
    }

    #[test]
    fn create_defaults_country_and_flags() {
        let property = sample_property();
        assert_eq!(property.address.country, "Nepal");
        assert!(property.is_active);
        assert_eq!(property.views, 0);
        assert_eq!(property.lease_duration, LeaseDuration::Flexible);
        assert_eq!(property.rules.gender_preference, GenderPreference::Any);
    }

    #[test]
    fn create_reports_missing_fields_once() {
        let errors = NewProperty::default()
            .into_property(UserId::new(), Utc::now())
            .unwrap_err();
        for field in [
            "title",
            "description",
            "address.street",
            "address.city",
            "propertyType",
            "totalRooms",
            "bathrooms",
            "rent",
            "deposit",
            "availableFrom",
        ] {
            assert!(errors.has_field(field), "{field}");
        }
        let total_rooms = errors.errors().iter().filter(|e| e.field == "totalRooms").count();
        assert_eq!(total_rooms, 1);
    }

    #[test]
    fn create_rejects_bad_image_urls_and_negative_rent() {
        let mut input = sample_new_property();
        input.images = vec![
            "https://cdn.example.com/a.JPG".to_string(),
            "ftp://cdn.example.com/b.png".to_string(),
        ];
        input.rent = Some(-1.0);
        let errors = input.into_property(UserId::new(), Utc::now()).unwrap_err();
        assert!(errors.has_field("images[1]"));
        assert!(!errors.has_field("images[0]"));
        assert!(errors.has_field("rent"));
    }

    #[test]
    fn amenities_are_stored_as_a_set() {
        let mut input = sample_new_property();
        input.amenities = vec![Amenity::Wifi, Amenity::Ac, Amenity::Wifi];
        let property = input.into_property(UserId::new(), Utc::now()).unwrap();
        assert_eq!(property.amenities, vec![Amenity::Wifi, Amenity::Ac]);
    }

    #[test]
    fn nested_patch_preserves_untouched_fields() {
        let mut property = sample_property();
        property.rules.pets_allowed = true;
        let patch: PropertyPatch = serde_json::from_value(serde_json::json!({
            "address": { "city": "Lalitpur" },
            "rules": { "smokingAllowed": true },
            "utilities": { "cost": 1500 }
        }))
        .unwrap();

        patch.apply(&mut property, Utc::now()).unwrap();

        assert_eq!(property.address.city, "Lalitpur");
        assert_eq!(property.address.street, "12 Jyatha Marg");
        assert!(property.rules.pets_allowed);
        assert!(property.rules.smoking_allowed);
        assert_eq!(property.utilities.cost, 1500.0);
        assert!(!property.utilities.included);
    }

    #[test]
    fn patch_rejects_unknown_keys_when_decoding() {
        let raw = serde_json::json!({ "landlord": "someone" });
        assert!(serde_json::from_value::<PropertyPatch>(raw).is_err());
    }

    #[test]
    fn patch_reports_invalid_date_and_short_title() {
        let mut property = sample_property();
        let patch = PropertyPatch {
            title: Some("abc".to_string()),
            available_from: Some("next tuesday".to_string()),
            ..PropertyPatch::default()
        };
        let errors = patch.apply(&mut property, Utc::now()).unwrap_err();
        assert!(errors.has_field("title"));
        assert!(errors.has_field("availableFrom"));
    }

    #[test]
    fn lease_duration_uses_wire_names() {
        let v: LeaseDuration = serde_json::from_str("\"6months\"").unwrap();
        assert_eq!(v, LeaseDuration::SixMonths);
        assert_eq!(serde_json::to_string(&LeaseDuration::OneYear).unwrap(), "\"1year\"");
    }

    #[test]
    fn parse_date_accepts_dates_and_timestamps() {
        assert!(parse_date("2024-06-01").is_some());
        assert!(parse_date("2024-06-01T10:00:00Z").is_some());
        assert!(parse_date("2024-06-01T10:00:00+05:45").is_some());
        assert!(parse_date("01/06/2024").is_none());
    }

    proptest! {
        /// Property: after any successful patch, available rooms never exceed total rooms.
        #[test]
        fn patched_rooms_respect_invariant(
            total in prop::option::of(1u32..50),
            available in prop::option::of(0u32..100),
        ) {
            let mut property = sample_property();
            let patch = PropertyPatch {
                total_rooms: total,
                available_rooms: available,
                ..PropertyPatch::default()
            };
            if patch.apply(&mut property, Utc::now()).is_ok() {
                prop_assert!(property.available_rooms <= property.total_rooms);
            }
        }

        /// Property: creation always stores a clamped availability.
        #[test]
        fn created_rooms_respect_invariant(total in 1u32..50, available in 0u32..100) {
            let mut input = sample_new_property();
            input.total_rooms = Some(total);
            input.available_rooms = Some(available);
            let property = input.into_property(UserId::new(), Utc::now()).unwrap();
            prop_assert_eq!(property.available_rooms, available.min(total));
        }
    }
}
